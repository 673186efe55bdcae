use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ParseError {
    #[error("line {line}: unexpected end of input in {context}")]
    UnexpectedEof { line: u32, context: &'static str },
    #[error("line {line}: expected {expected}, found '{found}'")]
    Syntax {
        line: u32,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: unknown type '{name}'")]
    UnknownType { line: u32, name: String },
    #[error("line {line}: redefinition of {what} '{name}'")]
    Redefinition {
        line: u32,
        what: &'static str,
        name: String,
    },
    #[error("line {line}: scope depth {depth} out of bounds (limit {limit})")]
    ScopeOutOfBounds { line: u32, depth: i64, limit: u32 },
    #[error("line {line}: invalid register slot '{slot}'")]
    InvalidRegisterSlot { line: u32, slot: String },
    #[error("line {line}: duplicate {block} block, the first was on line {first_line}")]
    DuplicateBlock {
        line: u32,
        block: &'static str,
        first_line: u32,
    },
    #[error("line {line}: scope opened here is never closed")]
    UnclosedScope { line: u32 },
}
impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            Self::UnexpectedEof { line, .. }
            | Self::Syntax { line, .. }
            | Self::UnknownType { line, .. }
            | Self::Redefinition { line, .. }
            | Self::ScopeOutOfBounds { line, .. }
            | Self::InvalidRegisterSlot { line, .. }
            | Self::DuplicateBlock { line, .. }
            | Self::UnclosedScope { line } => *line,
        }
    }
}

/// Why a construct failed, and whether the rest of the file can still be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Only the current declaration is lost, the driver skips it and continues
    #[error("{0}")]
    Recoverable(ParseError),
    /// Brace tracking can't be trusted any more, the whole parse is abandoned
    #[error("fatal: {0}")]
    Fatal(ParseError),
}
impl Fault {
    pub fn into_error(self) -> ParseError {
        match self {
            Self::Recoverable(e) | Self::Fatal(e) => e,
        }
    }

    /// Escalate a recoverable fault, used once a construct has consumed its own `{`
    pub fn into_fatal(self) -> Self {
        match self {
            Self::Recoverable(e) | Self::Fatal(e) => Self::Fatal(e),
        }
    }
}

pub type ParseResult<T> = Result<T, Fault>;
