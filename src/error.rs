//! Error types for taskvox

use thiserror::Error;

/// Result type alias for taskvox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in taskvox
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Task validation failure (e.g. empty title)
    #[error("validation error: {0}")]
    Validation(String),

    /// Task lookup against a nonexistent id
    #[error("not found: {0}")]
    NotFound(String),

    /// Audio device error (no microphone, capture/playback failure)
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

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
}
