use std::error::Error as StdError;

use thiserror::Error;

/// Vadscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Vadscribe's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Collaborator failures (detector, transcriber, decoder subprocess) surface through their
/// own variants; the orchestrator never retries and never returns partial results.
#[derive(Debug, Error)]
pub enum Error {
    /// The decoder subprocess failed. Carries the decoder's stderr verbatim.
    #[error("failed to load audio: {stderr}")]
    AudioLoad { stderr: String },

    /// A speech detector implementation failed.
    #[error("speech detector failed")]
    Detector(#[source] Box<dyn StdError + Send + Sync>),

    /// The transcriber callback failed; the in-flight transcription is aborted.
    #[error("transcriber failed")]
    Transcriber(#[source] Box<dyn StdError + Send + Sync>),

    /// An unknown non-speech strategy tag was supplied.
    #[error("unknown non-speech strategy: {0}")]
    InvalidStrategy(String),

    /// An interval came out of normalization inverted or non-finite.
    #[error("invalid interval [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap a detector implementation's failure.
    pub fn detector(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Detector(err.into())
    }

    /// Wrap a transcriber callback's failure.
    pub fn transcriber(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Transcriber(err.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
