//! CSS parsing errors.

use crate::node::SourceLocation;

/// CSS parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message describing what went wrong.
    pub message: String,
    /// Line number where the error occurred (1-indexed).
    pub line: u32,
    /// Column number where the error occurred (1-indexed).
    pub column: u32,
}

impl ParseError {
    /// Create a new parse error with the given message and location.
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a parse error at a source location.
    pub fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(message, location.line, location.column)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CSS parse error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<crate::document::TreeError> for ParseError {
    fn from(err: crate::document::TreeError) -> Self {
        Self::new(format!("tree error while parsing: {err}"), 0, 0)
    }
}
