use thiserror::Error;

/// Scanner diagnostic. Scanning continues after one is recorded.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Line {line}: {message}")]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

/// Parser diagnostic, anchored at the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[Line {line}] Error at '{lexeme}': {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub lexeme: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("'Spawn' must be the first statement.")]
    SpawnNotFirst,

    #[error("Duplicate label '{name}'.")]
    DuplicateLabel { name: String },

    #[error("Undefined label '{name}' in GoTo.")]
    UndefinedLabel { name: String },

    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String },

    #[error("Type mismatch in binary expression '{operator}'.")]
    TypeMismatch { operator: String },

    #[error("Spawn {axis} must evaluate to an integer.")]
    SpawnNotInteger { axis: char },

    #[error("Size must be an integer expression.")]
    SizeNotInteger,

    #[error("{context} must be an integer expression.")]
    DirectionNotInteger { context: String },

    #[error("{context} literal must be -1, 0 or 1.")]
    DirectionOutOfRange { context: String },

    #[error("GoTo condition must be boolean.")]
    ConditionNotBoolean,
}

/// Fatal interpreter failure. Execution stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Missing initial Spawn.")]
    MissingSpawn,

    #[error("Canvas size must be positive, got {size}.")]
    InvalidCanvasSize { size: usize },

    #[error("Spawn coordinates ({x}, {y}) out of canvas bounds.")]
    SpawnOutOfBounds { x: i32, y: i32 },

    #[error("Cursor ({x}, {y}) is outside the canvas.")]
    CursorOutOfBounds { x: i32, y: i32 },

    #[error("Brush size must be greater than 0, got {size}.")]
    InvalidBrushSize { size: i32 },

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Modulo by zero.")]
    ModuloByZero,

    #[error("Undefined variable {name}")]
    UndefinedVariable { name: String },

    #[error("Undefined label: {name}")]
    UndefinedLabel { name: String },

    #[error("Unknown function {name}")]
    UnknownFunction { name: String },

    #[error("Unsupported expression: {message}")]
    UnsupportedExpression { message: String },

    #[error("Step limit of {limit} statements exceeded.")]
    StepLimitExceeded { limit: u64 },
}

/// Pipeline failure: the first stage that reported anything, with everything it reported.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{} lexical error(s)", .0.len())]
    Lex(Vec<LexError>),

    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<SyntaxError>),

    #[error("{} semantic error(s)", .0.len())]
    Semantic(Vec<SemanticError>),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Every message this failure carries, one per line of a report.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Lex(errors) => errors.iter().map(ToString::to_string).collect(),
            Error::Syntax(errors) => errors.iter().map(ToString::to_string).collect(),
            Error::Semantic(errors) => errors.iter().map(ToString::to_string).collect(),
            Error::Runtime(error) => vec![error.to_string()],
            Error::Io { source } => vec![source.to_string()],
        }
    }
}
