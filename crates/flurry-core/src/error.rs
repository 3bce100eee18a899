//! Error types for Flurry

use thiserror::Error;

/// The main error type for Flurry operations
#[derive(Debug, Error)]
pub enum FlurryError {
    #[error("Unknown particle kind: {0}")]
    UnknownKind(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Feed error: {0}")]
    FeedError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type alias for Flurry operations
pub type Result<T> = std::result::Result<T, FlurryError>;

impl From<toml::de::Error> for FlurryError {
    fn from(err: toml::de::Error) -> Self {
        FlurryError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for FlurryError {
    fn from(err: toml::ser::Error) -> Self {
        FlurryError::TomlSerError(err.to_string())
    }
}
