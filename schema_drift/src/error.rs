//! Error types for schema_drift

use thiserror::Error;

use crate::schema::types::{Attribute, Side};

/// Result type for schema_drift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_drift
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Rejections raised while normalizing one side of a comparison.
///
/// These abort the whole comparison; no partial diff is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{side} file missing required column: {column}")]
    MissingRequiredColumn { side: Side, column: Attribute },

    #[error("{side} row {row} has an empty {column}")]
    EmptyKey {
        side: Side,
        row: usize,
        column: Attribute,
    },
}

impl ValidationError {
    /// The side whose input was malformed
    pub fn side(&self) -> Side {
        match self {
            ValidationError::MissingRequiredColumn { side, .. }
            | ValidationError::EmptyKey { side, .. } => *side,
        }
    }
}

/// Convert Serde JSON errors to schema_drift errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to schema_drift errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
