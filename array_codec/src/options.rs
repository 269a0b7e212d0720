//! Codec options
//!
//! Runtime knobs shared by the text and binary codecs.

use crate::errors::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};

/// Whitespace as PostgreSQL's array grammar sees it: space, `\t`, `\n`, `\r`, `\v`, `\f`
pub fn is_array_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0b}' | '\u{0c}')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Element delimiter in text literals (`,` for every built-in type but `box`)
    pub delimiter: char,
    /// Upper bound on decoded elements, 0 disables the check
    pub max_elements: usize,
}

impl CodecOptions {
    pub fn new(delimiter: char, max_elements: usize) -> Self {
        Self {
            delimiter,
            max_elements,
        }
    }

    /// Reject delimiters the literal grammar reserves for itself
    pub fn validate(&self) -> CodecResult<()> {
        if matches!(self.delimiter, '"' | '\\' | '{' | '}') || is_array_space(self.delimiter) {
            return Err(CodecError::malformed(
                0,
                format!(
                    "delimiter {:?} is reserved by the array literal grammar",
                    self.delimiter
                ),
            ));
        }
        Ok(())
    }

    /// Whether `len` elements fit under the configured maximum
    pub fn allows_len(&self, len: usize) -> bool {
        self.max_elements == 0 || len <= self.max_elements
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            max_elements: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_delimiters() {
        for delimiter in ['"', '\\', '{', '}', ' ', '\t', '\u{0b}', '\u{0c}'] {
            assert!(CodecOptions::new(delimiter, 0).validate().is_err(), "{:?}", delimiter);
        }
        assert!(CodecOptions::new(';', 0).validate().is_ok());
        assert!(CodecOptions::default().validate().is_ok());
    }
}
