//! Error types for jukebox-bot
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for jukebox-bot
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External resolver errors
    #[error("Resolver error: {0}")]
    Resolver(#[from] crate::resolver::ResolverError),

    /// Playlist collaborator errors
    #[error("Playlist error: {0}")]
    Playlist(String),

    /// Voice connection errors
    #[error("Voice error: {0}")]
    Voice(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<jukebox_common::Error> for Error {
    fn from(err: jukebox_common::Error) -> Self {
        match err {
            jukebox_common::Error::Io(e) => Error::Io(e),
            jukebox_common::Error::Config(msg) | jukebox_common::Error::InvalidInput(msg) => {
                Error::Config(msg)
            }
        }
    }
}

/// Convenience Result type using jukebox-bot Error
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single chat command
///
/// Every variant is rendered back to the issuing chat channel; none of them
/// changes playback state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Missing required argument, non-numeric index, unknown usage
    #[error("{0}")]
    UserInput(String),

    /// User not in a voice channel, playlist missing or already present
    #[error("{0}")]
    Precondition(String),

    /// Resolver or loader could not produce a track
    #[error("{0}")]
    Resolution(String),
}

impl CommandError {
    /// Chat text for this error
    pub fn to_message(&self) -> String {
        format!("❌ {}", self)
    }
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        match err {
            Error::Resolver(e) => CommandError::Resolution(e.to_string()),
            Error::Voice(msg) => CommandError::Precondition(msg),
            other => CommandError::Resolution(other.to_string()),
        }
    }
}
