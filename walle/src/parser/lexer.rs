use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::LexError;
use crate::ir::ast::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Инструкции
    Spawn, Color, Size, DrawLine, DrawCircle, DrawRectangle, Fill,
    GoTo,
    // Встроенные функции
    GetActualX, GetActualY, GetCanvasSize, GetColorCount,
    IsBrushColor, IsBrushSize, IsCanvasColor,
    // Литералы
    Number, String, Identifier, True, False,
    // Операторы
    Assign,        // <-
    Plus,          // +
    Minus,         // -
    Star,          // *
    Slash,         // /
    Percent,       // %
    Power,         // **
    Equal,         // =
    EqualEqual,    // ==
    Bang,          // !
    BangEqual,     // !=
    Greater,       // >
    Less,          // <
    GreaterEqual,  // >=
    LessEqual,     // <=
    And,           // &&
    Or,            // ||
    // Скобки
    LeftParen,     // (
    RightParen,    // )
    LeftBracket,   // [
    RightBracket,  // ]
    Comma,         // ,
    // Специальные
    NewLine,
    Eof,
}

impl TokenKind {
    /// Tokens the parser resynchronizes on after a broken statement.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Spawn
                | TokenKind::Color
                | TokenKind::Size
                | TokenKind::DrawLine
                | TokenKind::DrawCircle
                | TokenKind::DrawRectangle
                | TokenKind::Fill
                | TokenKind::GoTo
                | TokenKind::Identifier
        )
    }

    pub fn is_builtin(&self) -> bool {
        matches!(
            self,
            TokenKind::GetActualX
                | TokenKind::GetActualY
                | TokenKind::GetCanvasSize
                | TokenKind::GetColorCount
                | TokenKind::IsBrushColor
                | TokenKind::IsBrushSize
                | TokenKind::IsCanvasColor
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self { kind, text: text.into(), literal: None, line }
    }

    pub fn with_literal(kind: TokenKind, text: impl Into<String>, literal: Literal, line: usize) -> Self {
        Self { kind, text: text.into(), literal: Some(literal), line }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}'", self.kind, self.text.replace('\n', "\\n"))
    }
}

/// Scans the whole source. Never fails: problems land in the error list and
/// the token stream always ends with exactly one `Eof`.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        let simple = match ch {
            ' ' | '\t' | '\r' => None,
            '\n' => {
                tokens.push(Token::new(TokenKind::NewLine, "\n", line));
                line += 1;
                None
            }
            '<' => match chars.next_if(|&c| c == '-' || c == '=') {
                Some('-') => Some((TokenKind::Assign, "<-")),
                Some(_) => Some((TokenKind::LessEqual, "<=")),
                None => Some((TokenKind::Less, "<")),
            },
            '>' => match chars.next_if_eq(&'=') {
                Some(_) => Some((TokenKind::GreaterEqual, ">=")),
                None => Some((TokenKind::Greater, ">")),
            },
            '=' => match chars.next_if_eq(&'=') {
                Some(_) => Some((TokenKind::EqualEqual, "==")),
                None => Some((TokenKind::Equal, "=")),
            },
            '!' => match chars.next_if_eq(&'=') {
                Some(_) => Some((TokenKind::BangEqual, "!=")),
                None => Some((TokenKind::Bang, "!")),
            },
            '*' => match chars.next_if_eq(&'*') {
                Some(_) => Some((TokenKind::Power, "**")),
                None => Some((TokenKind::Star, "*")),
            },
            // A lone '&' or '|' produces nothing at all.
            '&' => chars.next_if_eq(&'&').map(|_| (TokenKind::And, "&&")),
            '|' => chars.next_if_eq(&'|').map(|_| (TokenKind::Or, "||")),
            '+' => Some((TokenKind::Plus, "+")),
            '-' => Some((TokenKind::Minus, "-")),
            '/' => Some((TokenKind::Slash, "/")),
            '%' => Some((TokenKind::Percent, "%")),
            '(' => Some((TokenKind::LeftParen, "(")),
            ')' => Some((TokenKind::RightParen, ")")),
            '[' => Some((TokenKind::LeftBracket, "[")),
            ']' => Some((TokenKind::RightBracket, "]")),
            ',' => Some((TokenKind::Comma, ",")),
            '"' => {
                let start_line = line;
                match parse_string(&mut chars, &mut line) {
                    Some(value) => tokens.push(Token::with_literal(
                        TokenKind::String,
                        format!("\"{}\"", value),
                        Literal::String(value),
                        start_line,
                    )),
                    None => errors.push(LexError {
                        line,
                        message: "Unterminated string.".to_string(),
                    }),
                }
                None
            }
            '0'..='9' => {
                let text = parse_number(ch, &mut chars);
                match text.parse::<i32>() {
                    Ok(n) => tokens.push(Token::with_literal(TokenKind::Number, text, Literal::Integer(n), line)),
                    Err(_) => errors.push(LexError {
                        line,
                        message: format!("Invalid number '{}'.", text),
                    }),
                }
                None
            }
            c if c.is_ascii_alphabetic() => {
                let ident = parse_identifier(ch, &mut chars);
                let token = match keyword(&ident) {
                    Some(TokenKind::True) => Token::with_literal(TokenKind::True, ident, Literal::Boolean(true), line),
                    Some(TokenKind::False) => Token::with_literal(TokenKind::False, ident, Literal::Boolean(false), line),
                    Some(kind) => Token::new(kind, ident, line),
                    None => Token::new(TokenKind::Identifier, ident, line),
                };
                tokens.push(token);
                None
            }
            other => {
                errors.push(LexError {
                    line,
                    message: format!("Unexpected character '{}'.", other),
                });
                None
            }
        };

        if let Some((kind, text)) = simple {
            tokens.push(Token::new(kind, text, line));
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", line));
    tracing::debug!(tokens = tokens.len(), errors = errors.len(), "scanned source");
    (tokens, errors)
}

fn keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "Spawn" => TokenKind::Spawn,
        "Color" => TokenKind::Color,
        "Size" => TokenKind::Size,
        "DrawLine" => TokenKind::DrawLine,
        "DrawCircle" => TokenKind::DrawCircle,
        "DrawRectangle" => TokenKind::DrawRectangle,
        "Fill" => TokenKind::Fill,
        "GoTo" => TokenKind::GoTo,
        "GetActualX" => TokenKind::GetActualX,
        "GetActualY" => TokenKind::GetActualY,
        "GetCanvasSize" => TokenKind::GetCanvasSize,
        "GetColorCount" => TokenKind::GetColorCount,
        "IsBrushColor" => TokenKind::IsBrushColor,
        "IsBrushSize" => TokenKind::IsBrushSize,
        "IsCanvasColor" => TokenKind::IsCanvasColor,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => return None,
    };
    Some(kind)
}

/// Reads up to the closing quote, which is consumed. `None` if the source ends first.
fn parse_string(chars: &mut Peekable<Chars<'_>>, line: &mut usize) -> Option<String> {
    let mut value = String::new();

    for ch in chars.by_ref() {
        match ch {
            '"' => return Some(value),
            '\n' => {
                *line += 1;
                value.push(ch);
            }
            _ => value.push(ch),
        }
    }

    None
}

fn parse_number(first: char, chars: &mut Peekable<Chars<'_>>) -> String {
    let mut num_str = String::from(first);

    while let Some(ch) = chars.next_if(|c| c.is_ascii_digit()) {
        num_str.push(ch);
    }

    num_str
}

fn parse_identifier(first: char, chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::from(first);

    while let Some(ch) = chars.next_if(|&c| c.is_ascii_alphanumeric() || c == '_') {
        ident.push(ch);
    }

    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn statement_with_arguments() {
        assert_eq!(
            kinds("Spawn(0, 10)\n"),
            vec![
                TokenKind::Spawn,
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RightParen,
                TokenKind::NewLine,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("<- == != && || >= <= ** < > * ="),
            vec![
                TokenKind::Assign,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Power,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Star,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_ampersand_and_pipe_are_dropped_silently() {
        assert_eq!(
            kinds("a & b | c"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn keywords_and_booleans() {
        let (tokens, _) = tokenize("GoTo IsCanvasColor true false Loop");
        assert_eq!(tokens[0].kind, TokenKind::GoTo);
        assert_eq!(tokens[1].kind, TokenKind::IsCanvasColor);
        assert_eq!(tokens[2].literal, Some(Literal::Boolean(true)));
        assert_eq!(tokens[3].literal, Some(Literal::Boolean(false)));
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
        assert_eq!(tokens[4].text, "Loop");
    }

    #[test]
    fn string_literal_value_excludes_quotes() {
        let (tokens, errors) = tokenize("Color(\"Red\")");
        assert!(errors.is_empty());
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\"Red\"");
        assert_eq!(tokens[2].literal, Some(Literal::String("Red".to_string())));
    }

    #[test]
    fn unterminated_string_is_reported_and_scanning_finishes() {
        let (tokens, errors) = tokenize("Color(\"Red");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Line 1: Unterminated string.");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn number_overflow_is_an_error() {
        let (tokens, errors) = tokenize("99999999999");
        assert_eq!(errors[0].message, "Invalid number '99999999999'.");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn unexpected_characters_are_skipped() {
        let (tokens, errors) = tokenize("x <- 1 @ 2\n_y");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "Line 1: Unexpected character '@'.");
        assert_eq!(errors[1].to_string(), "Line 2: Unexpected character '_'.");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::NewLine,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lines_advance_on_newlines() {
        let (tokens, _) = tokenize("a\n\nb");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 3);
        assert_eq!(tokens[4].line, 3);
    }

    #[test]
    fn display_shows_kind_and_text() {
        let (tokens, _) = tokenize("n <- 3");
        assert_eq!(tokens[0].to_string(), "Identifier 'n'");
        assert_eq!(tokens[1].to_string(), "Assign '<-'");
    }
}
