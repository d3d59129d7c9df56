//! Type checking over the parsed program.
//!
//! Variables take the type of their most recent preceding assignment, in
//! program order. Nothing here mutates the AST.

use std::collections::{HashMap, HashSet};

use crate::error::SemanticError;
use crate::ir::ast::{BinaryOperator, Expression, Literal, Program, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Integer,
    Boolean,
}

pub fn analyze(program: &Program) -> Vec<SemanticError> {
    let mut analyzer = Analyzer::new(program);
    analyzer.run();
    tracing::debug!(errors = analyzer.errors.len(), "semantic analysis finished");
    analyzer.errors
}

struct Analyzer<'p> {
    program: &'p Program,
    errors: Vec<SemanticError>,
    variables: HashMap<&'p str, SymbolType>,
    labels: HashSet<&'p str>,
}

impl<'p> Analyzer<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            program,
            errors: Vec::new(),
            variables: HashMap::new(),
            labels: HashSet::new(),
        }
    }

    fn run(&mut self) {
        let program = self.program;

        if !matches!(program.statements.first(), Some(Statement::Spawn { .. })) {
            self.errors.push(SemanticError::SpawnNotFirst);
        }

        for statement in &program.statements {
            if let Statement::Label { name } = statement {
                if !self.labels.insert(name.as_str()) {
                    self.errors.push(SemanticError::DuplicateLabel { name: name.clone() });
                }
            }
        }

        for statement in &program.statements {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, statement: &'p Statement) {
        match statement {
            Statement::Spawn { x, y } => {
                if self.check_expression(x) != SymbolType::Integer {
                    self.errors.push(SemanticError::SpawnNotInteger { axis: 'X' });
                }
                if self.check_expression(y) != SymbolType::Integer {
                    self.errors.push(SemanticError::SpawnNotInteger { axis: 'Y' });
                }
            }
            Statement::Size { size } => {
                if self.check_expression(size) != SymbolType::Integer {
                    self.errors.push(SemanticError::SizeNotInteger);
                }
            }
            // Only the directions are checked; lengths may be any expression.
            Statement::DrawLine { dir_x, dir_y, .. }
            | Statement::DrawCircle { dir_x, dir_y, .. }
            | Statement::DrawRectangle { dir_x, dir_y, .. } => {
                let name = statement.kind_name();
                self.check_direction(dir_x, &format!("{} dirX", name));
                self.check_direction(dir_y, &format!("{} dirY", name));
            }
            Statement::Assign { target, value } => {
                let symbol = self.check_expression(value);
                tracing::debug!(variable = %target, ?symbol, "inferred variable type");
                self.variables.insert(target.as_str(), symbol);
            }
            Statement::ConditionalGoto { label, condition } => {
                if !self.labels.contains(label.as_str()) {
                    self.errors.push(SemanticError::UndefinedLabel { name: label.clone() });
                }
                if self.check_expression(condition) != SymbolType::Boolean {
                    self.errors.push(SemanticError::ConditionNotBoolean);
                }
            }
            Statement::Color { .. } | Statement::Fill | Statement::Label { .. } => {}
        }
    }

    /// Must type as Integer; a literal must also lie in -1..=1.
    fn check_direction(&mut self, expr: &Expression, context: &str) {
        if self.check_expression(expr) != SymbolType::Integer {
            self.errors.push(SemanticError::DirectionNotInteger { context: context.to_string() });
            return;
        }

        if let Some(value) = expr.as_integer_literal() {
            if !(-1..=1).contains(&value) {
                self.errors.push(SemanticError::DirectionOutOfRange { context: context.to_string() });
            }
        }
    }

    fn check_expression(&mut self, expr: &Expression) -> SymbolType {
        match expr {
            Expression::Literal(Literal::Boolean(_)) => SymbolType::Boolean,
            // Strings only make sense as color arguments; they fall back to Integer.
            Expression::Literal(Literal::Integer(_) | Literal::String(_)) => SymbolType::Integer,
            Expression::Variable(name) => match self.variables.get(name.as_str()) {
                Some(symbol) => *symbol,
                None => {
                    self.errors.push(SemanticError::UndefinedVariable { name: name.clone() });
                    SymbolType::Integer
                }
            },
            Expression::Grouping(inner) => self.check_expression(inner),
            // Arguments are not inspected; a color name may be a bare identifier.
            Expression::FunctionCall { .. } => SymbolType::Integer,
            Expression::Binary { left, op, right } => {
                let left_type = self.check_expression(left);
                let right_type = self.check_expression(right);
                match binary_result(*op, left, left_type, right, right_type) {
                    Some(symbol) => symbol,
                    None => {
                        self.errors.push(SemanticError::TypeMismatch { operator: op.symbol().to_string() });
                        left_type
                    }
                }
            }
        }
    }
}

/// Result type of `left op right`, or `None` on a mismatch.
fn binary_result(
    op: BinaryOperator,
    left: &Expression,
    left_type: SymbolType,
    right: &Expression,
    right_type: SymbolType,
) -> Option<SymbolType> {
    use SymbolType::{Boolean, Integer};

    match op {
        _ if op.is_arithmetic() => (left_type == Integer && right_type == Integer).then_some(Integer),
        BinaryOperator::Greater
        | BinaryOperator::Less
        | BinaryOperator::GreaterEqual
        | BinaryOperator::LessEqual => (left_type == Integer && right_type == Integer).then_some(Boolean),
        BinaryOperator::Equal | BinaryOperator::NotEqual => {
            let same = left_type == right_type;
            // A Boolean may be compared with the literal 0 or 1.
            let bool_vs_bit = (left_type == Boolean && is_bit_literal(right))
                || (right_type == Boolean && is_bit_literal(left));
            (same || bool_vs_bit).then_some(Boolean)
        }
        BinaryOperator::And | BinaryOperator::Or => {
            (left_type == Boolean && right_type == Boolean).then_some(Boolean)
        }
        _ => None,
    }
}

fn is_bit_literal(expr: &Expression) -> bool {
    matches!(expr.as_integer_literal(), Some(0 | 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn errors_for(source: &str) -> Vec<String> {
        let program = parse(source).expect("source should parse");
        analyze(&program).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn counting_loop_is_well_typed() {
        let errors = errors_for("Spawn(0, 0)\nn <- 3\nLoop\nDrawLine(1, 0, 1)\nn <- n - 1\nGoTo [Loop] (n > 0)\n");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn goto_condition_must_be_boolean() {
        let errors = errors_for("Spawn(0, 0)\nn <- 3\nL\nGoTo [L] (n)\n");
        assert_eq!(errors, vec!["GoTo condition must be boolean."]);
    }

    #[test]
    fn arithmetic_on_boolean_is_a_mismatch() {
        let errors = errors_for("Spawn(0, 0)\nx <- 1 + true\nSize(x)\n");
        // The mismatch still types as the left operand, so Size(x) is fine.
        assert_eq!(errors, vec!["Type mismatch in binary expression '+'."]);
    }

    #[test]
    fn boolean_equals_bit_literal_in_either_order() {
        assert!(errors_for("Spawn(0, 0)\nb <- true\nc <- b == 1\nd <- 0 != b\n").is_empty());
        assert_eq!(
            errors_for("Spawn(0, 0)\nb <- true\nc <- b == 2\n"),
            vec!["Type mismatch in binary expression '=='."]
        );
        // Only a bare literal qualifies, not a grouped one.
        assert_eq!(
            errors_for("Spawn(0, 0)\nb <- true\nc <- b == (1)\n"),
            vec!["Type mismatch in binary expression '=='."]
        );
    }

    #[test]
    fn logical_operators_need_booleans() {
        assert!(errors_for("Spawn(0, 0)\nb <- 1 < 2 && true || false\n").is_empty());
        assert_eq!(
            errors_for("Spawn(0, 0)\nb <- 1 && true\n"),
            vec!["Type mismatch in binary expression '&&'."]
        );
    }

    #[test]
    fn undefined_variables_are_reported_and_analysis_continues() {
        let errors = errors_for("Spawn(0, 0)\ny <- z + 1\nw <- q * 2\n");
        assert_eq!(errors, vec!["Undefined variable 'z'.", "Undefined variable 'q'."]);
    }

    #[test]
    fn variables_take_their_latest_type() {
        assert!(errors_for("Spawn(0, 0)\na <- 1\na <- true\nL\nGoTo [L] (a)\n").is_empty());
    }

    #[test]
    fn builtins_type_as_integer() {
        assert!(errors_for("Spawn(0, 0)\nok <- GetActualX() > 0 && IsBrushSize(1) == 1\n").is_empty());
    }

    #[test]
    fn spawn_size_and_direction_types() {
        let errors = errors_for("Spawn(true, 0)\nSize(false)\nd <- true\nDrawLine(d, 0, 1)\n");
        assert_eq!(
            errors,
            vec![
                "Spawn X must evaluate to an integer.",
                "Size must be an integer expression.",
                "DrawLine dirX must be an integer expression.",
            ]
        );
    }

    #[test]
    fn draw_lengths_are_not_type_checked() {
        let errors = errors_for("Spawn(0, 0)\nb <- 1 < 2\nDrawLine(1, 0, b)\nDrawRectangle(0, 0, 1, true, 2)\n");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn call_arguments_are_not_inspected() {
        assert!(errors_for("Spawn(0, 0)\nColor(Red)\nx <- IsBrushColor(Red)\n").is_empty());
        assert!(errors_for("Spawn(0, 0)\nn <- GetColorCount(\"Red\", q, 0, 1, 1)\n").is_empty());
    }

    #[test]
    fn literal_directions_are_range_checked() {
        let mut program = Program::default();
        program.push(Statement::Spawn { x: Expression::integer(0), y: Expression::integer(0) }, 1);
        program.push(
            Statement::DrawCircle {
                dir_x: Expression::integer(2),
                dir_y: Expression::integer(-1),
                radius: Expression::integer(3),
            },
            2,
        );
        let errors: Vec<String> = analyze(&program).iter().map(ToString::to_string).collect();
        assert_eq!(errors, vec!["DrawCircle dirX literal must be -1, 0 or 1."]);
    }

    #[test]
    fn structural_checks_on_hand_built_programs() {
        let mut program = Program::default();
        program.push(Statement::Label { name: "a".to_string() }, 1);
        program.push(Statement::Label { name: "a".to_string() }, 2);
        program.push(
            Statement::ConditionalGoto {
                label: "b".to_string(),
                condition: Expression::Literal(Literal::Boolean(true)),
            },
            3,
        );
        assert_eq!(
            analyze(&program),
            vec![
                SemanticError::SpawnNotFirst,
                SemanticError::DuplicateLabel { name: "a".to_string() },
                SemanticError::UndefinedLabel { name: "b".to_string() },
            ]
        );
    }
}
