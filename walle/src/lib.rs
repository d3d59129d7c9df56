//! WallE: a tiny drawing language for a robot painting on a square canvas.
//!
//! Source goes through four stages, each of which must come back clean before
//! the next one starts:
//!
//! 1. [`parser::lexer::tokenize`] turns text into tokens,
//! 2. [`parser::parser::parse_tokens`] builds a [`ir::ast::Program`],
//! 3. [`semantic::analyze`] type checks it,
//! 4. [`runtime::Interpreter`] executes it against a [`runtime::Canvas`].

pub mod config;
pub mod error;
pub mod ir;
pub mod parser;
pub mod runtime;
pub mod semantic;

pub use config::RunConfig;
pub use error::Error;

use ir::ast::Program;
use runtime::{Canvas, Interpreter};

/// Scans, parses and type checks `source`.
pub fn check(source: &str) -> Result<Program, Error> {
    let program = parser::parse(source)?;

    let errors = semantic::analyze(&program);
    if !errors.is_empty() {
        return Err(Error::Semantic(errors));
    }

    Ok(program)
}

/// Checks `source`, then runs it on a fresh canvas.
pub fn run(source: &str, config: &RunConfig) -> Result<Canvas, Error> {
    let program = check(source)?;

    let mut interpreter = Interpreter::new(&program, config.canvas_size)?.with_step_limit(config.max_steps);
    interpreter.execute()?;

    Ok(interpreter.into_canvas())
}
