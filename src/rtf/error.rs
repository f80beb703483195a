//! Error types for rich-text parsing.

use std::fmt;

/// Result type for rich-text operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// Rich-text parsing errors.
#[derive(Debug, Clone)]
pub enum RtfError {
    /// Unexpected end of input
    UnexpectedEof,
    /// Invalid control word
    InvalidControlWord(String),
    /// Invalid hex or unicode escape
    InvalidEscape(String),
    /// Malformed document structure
    MalformedDocument(String),
}

impl fmt::Display for RtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtfError::UnexpectedEof => write!(f, "Unexpected end of input"),
            RtfError::InvalidControlWord(msg) => write!(f, "Invalid control word: {}", msg),
            RtfError::InvalidEscape(msg) => write!(f, "Invalid escape: {}", msg),
            RtfError::MalformedDocument(msg) => write!(f, "Malformed RTF document: {}", msg),
        }
    }
}

impl std::error::Error for RtfError {}

impl From<std::num::ParseIntError> for RtfError {
    fn from(err: std::num::ParseIntError) -> Self {
        RtfError::InvalidControlWord(format!("integer parameter: {}", err))
    }
}
