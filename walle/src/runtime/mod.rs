pub mod canvas;
pub mod interpreter;
pub mod palette;

pub use canvas::{BLANK, Canvas, ColorCode};
pub use interpreter::Interpreter;
pub use palette::Palette;
