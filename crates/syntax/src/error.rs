use crate::ast::Pos;

/// A lexing or parsing failure, located at a 1-based line and byte column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(file: &str, pos: Pos, message: impl Into<String>) -> Self {
        ParseError {
            file: file.to_owned(),
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }
}
