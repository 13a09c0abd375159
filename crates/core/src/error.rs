//! Error types for the implied-volatility normalizer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the normalizer.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input table does not have the expected shape (missing or duplicate column).
    #[error("Schema error: {0}")]
    Schema(String),

    /// A cell could not be read or coerced to its column type.
    #[error("Data error: {0}")]
    Data(String),

    /// RIC too short to contain a base segment.
    #[error("RIC parse error: {0}")]
    RicParse(String),

    /// Contract period could not be interpreted.
    #[error("Period error: {0}")]
    Period(String),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a RIC parse error.
    pub fn ric_parse(msg: impl Into<String>) -> Self {
        Error::RicParse(msg.into())
    }

    /// Create a period error.
    pub fn period(msg: impl Into<String>) -> Self {
        Error::Period(msg.into())
    }

    /// Create a CSV error.
    pub fn csv(msg: impl Into<String>) -> Self {
        Error::Csv(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Whether this error comes from a single malformed row rather than the
    /// shape of the input or the environment.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Error::RicParse(_) | Error::Period(_))
    }
}
