pub mod ast;
pub mod builtin;
