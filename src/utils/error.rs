//! Error types for Playdeck
//!
//! This module defines custom error types used throughout the application.
//! We use thiserror for convenient error type definitions and anyhow for
//! application-level error handling in the binary.
//!
//! The error enum only covers blocking failures. Recoverable user feedback
//! ("no next track", "already playing") travels as
//! [`PlayerWarning`](crate::player::PlayerWarning) events instead, never as
//! errors.

use thiserror::Error;

/// Main error type for Playdeck
#[derive(Error, Debug)]
pub enum PlaydeckError {
    /// Audio backend errors (device, sink, output stream)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Media decode errors reported by the backend
    #[error("Decode error: {0}")]
    Decode(String),

    /// Cursor addressing outside the playlist
    #[error("There's no such track at index {index} (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playlist store errors
    #[error("Playlist store error: {0}")]
    Store(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),
}

impl PlaydeckError {
    /// Create a backend error from string
    pub fn backend_error<S: Into<String>>(msg: S) -> Self {
        PlaydeckError::Backend(msg.into())
    }
}

/// Convenience type alias for Results in Playdeck
pub type Result<T> = std::result::Result<T, PlaydeckError>;

/// Extension trait for converting other errors to PlaydeckError
pub trait IntoPlaydeckError<T> {
    /// Convert this error into a PlaydeckError with the given context
    fn backend_err(self, context: &str) -> Result<T>;
    fn decode_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
    fn store_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlaydeckError<T> for std::result::Result<T, E> {
    fn backend_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlaydeckError::Backend(format!("{}: {}", context, e)))
    }

    fn decode_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlaydeckError::Decode(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlaydeckError::Config(format!("{}: {}", context, e)))
    }

    fn store_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlaydeckError::Store(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaydeckError::Backend("no output device".to_string());
        assert_eq!(err.to_string(), "Backend error: no output device");

        let err = PlaydeckError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "There's no such track at index 7 (playlist has 3 tracks)"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PlaydeckError = io_err.into();
        assert!(matches!(err, PlaydeckError::FileIO(_)));
    }

    #[test]
    fn test_into_playdeck_error_trait() {
        let result: std::result::Result<(), &str> = Err("sink was dropped");
        let converted = result.backend_err("Appending source");

        match converted {
            Err(PlaydeckError::Backend(msg)) => {
                assert_eq!(msg, "Appending source: sink was dropped");
            }
            _ => panic!("Expected Backend error"),
        }
    }
}
