use thiserror::Error;

/// Errors raised while deriving fields from a single demographic value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The identifier has no seven-digit run or not exactly two letters.
    #[error("malformed identifier: {value:?}")]
    MalformedIdentifier { value: String },

    /// The gender value is outside the F/M mapping.
    #[error("unrecognized gender: {value:?}")]
    UnrecognizedGender { value: String },

    /// The age is missing, negative or not a whole number.
    #[error("invalid age: {value:?}")]
    InvalidAge { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
