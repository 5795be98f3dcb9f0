//! Error types for the Vesper assistant core

use thiserror::Error;

/// Result type alias for Vesper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant core
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A required host capability is absent
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Microphone access was declined by the user
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The recognition engine failed to start
    #[error("engine start error: {0}")]
    EngineStart(String),

    /// Speech recognition error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// AI query failure (network, model, or empty answer)
    #[error("AI query error: {0}")]
    AiQuery(String),

    /// Reminder error
    #[error("reminder error: {0}")]
    Reminder(String),

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

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
