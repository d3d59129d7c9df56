use std::collections::HashMap;
use std::fmt;

/// Parsed program: a flat statement list addressed by index.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Source line of each statement, parallel to `statements`.
    pub lines: Vec<usize>,
    /// Label name -> index of its first definition in `statements`.
    pub labels: HashMap<String, usize>,
}

impl Program {
    pub fn push(&mut self, statement: Statement, line: usize) {
        self.statements.push(statement);
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Place the cursor, e.g. `Spawn(0, 0)`
    Spawn { x: Expression, y: Expression },
    /// Select the brush color, e.g. `Color("Red")`
    Color { name: String },
    /// Set the brush size, e.g. `Size(3)`
    Size { size: Expression },
    /// `DrawLine(1, 0, 5)`
    DrawLine {
        dir_x: Expression,
        dir_y: Expression,
        distance: Expression,
    },
    /// `DrawCircle(0, 1, 4)`
    DrawCircle {
        dir_x: Expression,
        dir_y: Expression,
        radius: Expression,
    },
    /// `DrawRectangle(1, 1, 2, 5, 3)`
    DrawRectangle {
        dir_x: Expression,
        dir_y: Expression,
        distance: Expression,
        width: Expression,
        height: Expression,
    },
    /// Flood fill from the cursor: `Fill()`
    Fill,
    /// `n <- n - 1`
    Assign { target: String, value: Expression },
    /// A bare identifier on its own line.
    Label { name: String },
    /// `GoTo [loop] (n > 0)`
    ConditionalGoto { label: String, condition: Expression },
}

impl Statement {
    /// Keyword-style name used in summaries and traces.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Spawn { .. } => "Spawn",
            Statement::Color { .. } => "Color",
            Statement::Size { .. } => "Size",
            Statement::DrawLine { .. } => "DrawLine",
            Statement::DrawCircle { .. } => "DrawCircle",
            Statement::DrawRectangle { .. } => "DrawRectangle",
            Statement::Fill => "Fill",
            Statement::Assign { .. } => "Assign",
            Statement::Label { .. } => "Label",
            Statement::ConditionalGoto { .. } => "GoTo",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i32),
    Boolean(bool),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// 10, true, "Red"
    Literal(Literal),
    /// n, counter
    Variable(String),
    /// n - 1
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// (n + 1), kept so later passes can see explicit grouping
    Grouping(Box<Expression>),
    /// GetActualX(), GetColorCount("Red", 0, 0, 5, 5)
    FunctionCall { name: String, args: Vec<Expression> },
}

impl Expression {
    pub fn integer(value: i32) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// The integer value when this node is itself an integer literal.
    pub fn as_integer_literal(&self) -> Option<i32> {
        match self {
            Expression::Literal(Literal::Integer(n)) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,          // +
    Subtract,     // -
    Multiply,     // *
    Divide,       // /
    Modulo,       // %
    Power,        // **
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=
    And,          // &&
    Or,           // ||
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
                | BinaryOperator::Power
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
