//! Error types for the array codec
//!
//! Every decode failure, whether the input breaks the array grammar or an
//! element cannot be coerced to the declared type, is reported as
//! `MalformedArrayLiteral`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// `position` is a character index for text literals and a byte offset
    /// for binary input.
    #[error("Malformed array literal at position {position}: {reason}")]
    MalformedArrayLiteral { position: usize, reason: String },

    #[error("Array element too large to encode: {0} bytes")]
    ElementTooLarge(usize),
}

impl CodecError {
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedArrayLiteral {
            position,
            reason: reason.into(),
        }
    }

    /// Position of a decode failure, `None` for encode-side errors
    pub fn position(&self) -> Option<usize> {
        match self {
            CodecError::MalformedArrayLiteral { position, .. } => Some(*position),
            CodecError::ElementTooLarge(_) => None,
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
