//! Error types for Yuki gateway

use thiserror::Error;

/// Result type alias for Yuki operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Yuki gateway
///
/// The routing core never surfaces these to the speaker; handlers convert
/// them into apology replies at their boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Application or URL launch failure
    #[error("launch error: {0}")]
    Launch(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// Weather lookup error
    #[error("weather error: {0}")]
    Weather(String),

    /// Conversational backend error
    #[error(transparent)]
    Backend(#[from] crate::llm::BackendError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML document editing error
    #[error("toml edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    /// Invalid pattern
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}
