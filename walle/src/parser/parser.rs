use super::lexer::{Token, TokenKind};
use crate::error::SyntaxError;
use crate::ir::ast::{self, BinaryOperator, Expression, Literal, Statement};
use crate::ir::builtin::Builtin;

/// Builds the program and collects every syntax error instead of stopping at the first.
pub fn parse_tokens(tokens: &[Token]) -> (ast::Program, Vec<SyntaxError>) {
    let mut parser = Parser::new(tokens);
    parser.parse_program();
    tracing::debug!(
        statements = parser.program.len(),
        errors = parser.errors.len(),
        "parsed program"
    );
    (parser.program, parser.errors)
}

/// Aborts the statement being parsed; the error itself was already recorded.
struct Abort;

type ParseResult<T> = Result<T, Abort>;

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    program: ast::Program,
    errors: Vec<SyntaxError>,
    has_spawn: bool,
    /// GoTo targets, checked once every label is known.
    label_references: Vec<Token>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            program: ast::Program::default(),
            errors: Vec::new(),
            has_spawn: false,
            label_references: Vec::new(),
        }
    }

    fn parse_program(&mut self) {
        let mut spawn_checked = false;

        while !self.is_at_end() {
            let start = self.current().clone();
            let Some(statement) = self.parse_statement() else {
                continue;
            };

            // A broken Spawn still counts as the first statement.
            if !spawn_checked {
                if !self.has_spawn && !matches!(statement, Statement::Spawn { .. }) {
                    self.error_at(&start, "'Spawn' must be the first executable statement.");
                }
                spawn_checked = true;
            }

            if let Statement::Label { name } = &statement {
                if self.program.labels.contains_key(name) {
                    self.error_at(&start, format!("Duplicate label '{}'.", name));
                } else {
                    self.program.labels.insert(name.clone(), self.program.len());
                }
            }

            self.program.push(statement, start.line);
        }

        if !self.has_spawn {
            let eof = self.current().clone();
            self.error_at(&eof, "Missing 'Spawn(...)' instruction at the beginning.");
        }

        self.resolve_labels();
    }

    /// Every GoTo target must name a label defined anywhere in the program.
    fn resolve_labels(&mut self) {
        let undefined: Vec<Token> = self
            .label_references
            .iter()
            .filter(|token| !self.program.labels.contains_key(&token.text))
            .cloned()
            .collect();

        for token in undefined {
            self.error_at(&token, format!("Undefined label '{}'.", token.text));
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let result = match self.current().kind {
            TokenKind::NewLine => {
                self.advance();
                return None;
            }
            TokenKind::Spawn => self.parse_spawn(),
            TokenKind::Color => self.parse_color(),
            TokenKind::Size => self.parse_size(),
            TokenKind::DrawLine => self.parse_draw_line(),
            TokenKind::DrawCircle => self.parse_draw_circle(),
            TokenKind::DrawRectangle => self.parse_draw_rectangle(),
            TokenKind::Fill => self.parse_fill(),
            TokenKind::GoTo => self.parse_goto(),
            TokenKind::Identifier => match self.lookahead(1).map(|t| t.kind) {
                Some(TokenKind::NewLine | TokenKind::Eof) | None => self.parse_label(),
                Some(TokenKind::Assign) => self.parse_assign(),
                _ => return self.skip_unexpected(),
            },
            _ => return self.skip_unexpected(),
        };

        match result {
            Ok(statement) => Some(statement),
            Err(Abort) => {
                self.synchronize();
                None
            }
        }
    }

    fn skip_unexpected(&mut self) -> Option<Statement> {
        let token = self.current().clone();
        self.error_at(&token, "Expected a statement, assignment or label.");
        self.advance();
        None
    }

    fn parse_spawn(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance().clone(); // consume 'Spawn'
        if self.has_spawn {
            self.error_at(&keyword, "Only one 'Spawn' allowed.");
            return Err(Abort);
        }
        self.has_spawn = true;

        self.expect(TokenKind::LeftParen, "Expected '(' after Spawn.")?;
        let x = self.parse_expression()?;
        self.expect(TokenKind::Comma, "Expected ',' between x and y in Spawn.")?;
        let y = self.parse_expression()?;
        if self.check(TokenKind::Comma) {
            self.error_here("Spawn takes exactly two arguments.");
        }
        self.expect(TokenKind::RightParen, "Expected ')' after Spawn arguments.")?;
        self.end_of_statement("Spawn");

        Ok(Statement::Spawn { x, y })
    }

    fn parse_color(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'Color'
        self.expect(TokenKind::LeftParen, "Expected '(' after Color.")?;

        let name = match self.current() {
            Token { kind: TokenKind::String, literal: Some(Literal::String(value)), .. } => value.clone(),
            Token { kind: TokenKind::Identifier, text, .. } => text.clone(),
            _ => {
                self.error_here("Expected color name as string or identifier for Color.");
                return Err(Abort);
            }
        };
        self.advance();

        self.expect(TokenKind::RightParen, "Expected ')' after Color argument.")?;
        self.end_of_statement("Color");

        Ok(Statement::Color { name })
    }

    fn parse_size(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'Size'
        self.expect(TokenKind::LeftParen, "Expected '(' after Size.")?;
        let size = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')' after Size argument.")?;
        self.end_of_statement("Size");

        Ok(Statement::Size { size })
    }

    fn parse_draw_line(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'DrawLine'
        self.expect(TokenKind::LeftParen, "Expected '(' after DrawLine.")?;
        let (dir_x, dir_y) = self.parse_directions()?;
        let distance = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')' after DrawLine arguments.")?;
        self.end_of_statement("DrawLine");

        Ok(Statement::DrawLine { dir_x, dir_y, distance })
    }

    fn parse_draw_circle(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'DrawCircle'
        self.expect(TokenKind::LeftParen, "Expected '(' after DrawCircle.")?;
        let (dir_x, dir_y) = self.parse_directions()?;
        let radius = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')' after DrawCircle arguments.")?;
        self.end_of_statement("DrawCircle");

        Ok(Statement::DrawCircle { dir_x, dir_y, radius })
    }

    fn parse_draw_rectangle(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'DrawRectangle'
        self.expect(TokenKind::LeftParen, "Expected '(' after DrawRectangle.")?;
        let (dir_x, dir_y) = self.parse_directions()?;
        let distance = self.parse_expression()?;
        self.expect(TokenKind::Comma, "Expected ',' after distance.")?;
        let width = self.parse_expression()?;
        self.expect(TokenKind::Comma, "Expected ',' after width.")?;
        let height = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')' after DrawRectangle arguments.")?;
        self.end_of_statement("DrawRectangle");

        Ok(Statement::DrawRectangle { dir_x, dir_y, distance, width, height })
    }

    /// `dirX, dirY,`: the leading pair shared by every draw statement.
    fn parse_directions(&mut self) -> ParseResult<(Expression, Expression)> {
        let dir_x = self.parse_expression()?;
        self.restrict_to_direction(&dir_x, "dirX")?;
        self.expect(TokenKind::Comma, "Expected ',' after dirX.")?;

        let dir_y = self.parse_expression()?;
        self.restrict_to_direction(&dir_y, "dirY")?;
        self.expect(TokenKind::Comma, "Expected ',' after dirY.")?;

        Ok((dir_x, dir_y))
    }

    /// Only literal directions can be range-checked here.
    fn restrict_to_direction(&mut self, expr: &Expression, field: &str) -> ParseResult<()> {
        match expr.as_integer_literal() {
            Some(value) if !(-1..=1).contains(&value) => {
                self.error_here(format!("{} must be -1, 0 or 1.", field));
                Err(Abort)
            }
            _ => Ok(()),
        }
    }

    fn parse_fill(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'Fill'
        self.expect(TokenKind::LeftParen, "Expected '(' after Fill.")?;
        self.expect(TokenKind::RightParen, "Expected ')' after Fill.")?;
        self.end_of_statement("Fill");

        Ok(Statement::Fill)
    }

    fn parse_label(&mut self) -> ParseResult<Statement> {
        let name = self.advance().text.clone();
        self.end_of_statement("label");

        Ok(Statement::Label { name })
    }

    fn parse_assign(&mut self) -> ParseResult<Statement> {
        let target = self.advance().text.clone();
        self.expect(TokenKind::Assign, "Expected '<-' after variable name.")?;
        let value = self.parse_expression()?;
        self.end_of_statement("<-");

        Ok(Statement::Assign { target, value })
    }

    fn parse_goto(&mut self) -> ParseResult<Statement> {
        self.advance(); // consume 'GoTo'
        self.expect(TokenKind::LeftBracket, "Expected '[' after GoTo.")?;
        let label = self.expect(TokenKind::Identifier, "Expected label inside GoTo brackets.")?;
        self.expect(TokenKind::RightBracket, "Expected ']' after label.")?;
        self.expect(TokenKind::LeftParen, "Expected '(' after GoTo label.")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')' after GoTo condition.")?;
        self.end_of_statement("GoTo");

        self.label_references.push(label.clone());
        Ok(Statement::ConditionalGoto { label: label.text, condition })
    }

    /// A statement ends at a newline (consumed) or at end of input. Anything
    /// else is reported, but the statement is still kept.
    fn end_of_statement(&mut self, after: &str) {
        match self.current().kind {
            TokenKind::NewLine => {
                self.advance();
            }
            TokenKind::Eof => {}
            _ => self.error_here(format!("Expected end of line after {}.", after)),
        }
    }

    // Выражения, от низшего приоритета к высшему

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::binary(left, BinaryOperator::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::And) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expression::binary(left, BinaryOperator::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::BangEqual => BinaryOperator::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
                TokenKind::LessEqual => BinaryOperator::LessEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                TokenKind::Power => BinaryOperator::Power,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    /// `-x` becomes `0 - x`.
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.check(TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::binary(Expression::integer(0), BinaryOperator::Subtract, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.current().clone();
        match token.kind {
            kind if kind == TokenKind::Identifier || kind.is_builtin() => {
                self.advance();
                if self.check(TokenKind::LeftParen) {
                    self.parse_call(token.text)
                } else {
                    Ok(Expression::Variable(token.text))
                }
            }
            TokenKind::True | TokenKind::False | TokenKind::Number | TokenKind::String => {
                self.advance();
                match token.literal {
                    Some(literal) => Ok(Expression::Literal(literal)),
                    None => {
                        self.error_at(&token, "Literal token without a value.");
                        Err(Abort)
                    }
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "Expected ')' after expression.")?;
                Ok(Expression::Grouping(Box::new(inner)))
            }
            _ => {
                self.error_at(&token, format!("Unexpected token '{}'.", printable(&token.text)));
                Err(Abort)
            }
        }
    }

    fn parse_call(&mut self, name: String) -> ParseResult<Expression> {
        self.advance(); // consume '('

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        let close = self.expect(TokenKind::RightParen, "Expected ')' after function arguments.")?;

        if let Some(builtin) = Builtin::from_name(&name) {
            let expected = builtin.arity();
            if args.len() != expected {
                let message = match expected {
                    0 => format!("Function '{}' does not take arguments.", name),
                    1 => format!("Function '{}' requires 1 argument.", name),
                    n => format!("Function '{}' requires {} arguments.", name, n),
                };
                self.error_at(&close, message);
            }
        }

        Ok(Expression::FunctionCall { name, args })
    }

    /// Skips ahead to a clean statement boundary: just past a newline, or at
    /// a token that can begin a statement.
    fn synchronize(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::NewLine || self.current().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // Вспомогательные методы

    fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(SyntaxError {
            line: token.line,
            lexeme: printable(&token.text),
            message: message.into(),
        });
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let token = self.current().clone();
        self.error_at(&token, message);
    }

    fn current(&self) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        match tokens.get(self.position).or_else(|| tokens.last()) {
            Some(token) => token,
            None => &EOF,
        }
    }

    fn previous(&self) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        self.position
            .checked_sub(1)
            .and_then(|index| tokens.get(index))
            .unwrap_or(&EOF)
    }

    fn lookahead(&self, n: usize) -> Option<&'t Token> {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.position + n)
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect(&mut self, expected: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance().clone())
        } else {
            self.error_here(message);
            Err(Abort)
        }
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }
}

fn printable(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Stand-in for a token stream that lacks its terminating `Eof`.
static EOF: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
    literal: None,
    line: 0,
};
