//! Unified error types for the domain layer
//!
//! Provides a common error type for rules operations so that the engine can
//! map failures without falling back to strings.

use thiserror::Error;

use crate::value_objects::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Effect change key is not present in the registry
    #[error("Unregistered effect change key: {0}")]
    UnregisteredChange(String),

    /// Effect change value does not match the registered value type
    #[error("Invalid value '{value}' for effect change '{key}'")]
    InvalidChangeValue { key: String, value: String },
}

impl DomainError {
    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn unregistered_change(key: impl Into<String>) -> Self {
        Self::UnregisteredChange(key.into())
    }

    pub fn invalid_change_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidChangeValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
