//! Error types for speech studio

use thiserror::Error;

/// Result type alias for speech studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to the user for any failed generation other than a config error
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate speech. Please try again. Ensure API Key is set.";

/// Why a well-formed speech response carried no audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingAudio {
    /// Response had no candidates
    NoCandidate,
    /// First candidate had no content parts
    NoContent,
    /// First content part had no inline data
    NoInlineData,
}

impl std::fmt::Display for MissingAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::NoCandidate => "no candidate",
            Self::NoContent => "no content part",
            Self::NoInlineData => "no inline data",
        };
        f.write_str(reason)
    }
}

/// Errors that can occur in speech studio
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Script text was empty or whitespace
    #[error("text must not be empty")]
    EmptyText,

    /// Speech API returned an error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Speech API answered without any audio payload
    #[error("no audio data received ({0})")]
    NoAudio(MissingAudio),

    /// Base64 payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Audio device or format error
    #[error("audio error: {0}")]
    Audio(String),

    /// A source is already attached to the playback graph
    #[error("playback source already attached")]
    AlreadyAttached,

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// WAV parsing error
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

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

impl Error {
    /// Human-readable message for the user
    ///
    /// Upstream and empty-result failures collapse into one generic message;
    /// the root cause is only logged.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => msg.clone(),
            Self::EmptyText => "Please enter some text first.".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Upstream(_) | Self::NoAudio(_) | Self::Http(_) | Self::Decode(_) => {
                GENERATION_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}
