//! Parse errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character {found:?}")]
    UnexpectedChar { found: String },

    #[error("unexpected {found}, expected {expected}")]
    Unexpected { found: String, expected: String },

    #[error("unexpected end of input, expected {expected}")]
    Eof { expected: String },

    #[error("duplicate module declaration '{second}' (module is already '{first}')")]
    DuplicateModule { first: String, second: String },

    #[error("invalid numeric literal {text:?}")]
    InvalidNumber { text: String },
}
