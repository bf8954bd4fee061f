use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EisError {
    /// Empty batch, or a record missing or mistyping a required numeric field.
    InvalidInput(String),
}

impl fmt::Display for EisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EisError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for EisError {}

pub type Result<T> = std::result::Result<T, EisError>;
