pub mod lexer;
pub mod parser;

use crate::error::Error;
use crate::ir::ast;

/// Главная функция парсера - из текста в AST.
/// Stops after scanning if the scanner reported anything.
pub fn parse(source: &str) -> Result<ast::Program, Error> {
    let (tokens, lex_errors) = lexer::tokenize(source);
    if !lex_errors.is_empty() {
        return Err(Error::Lex(lex_errors));
    }

    let (program, syntax_errors) = parser::parse_tokens(&tokens);
    if !syntax_errors.is_empty() {
        return Err(Error::Syntax(syntax_errors));
    }

    Ok(program)
}
