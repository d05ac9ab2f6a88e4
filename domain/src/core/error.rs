//! Domain error types
//!
//! Every failure the chat client can observe is classified into exactly one
//! of the kinds below. Stream-level errors are delivered to observers rather
//! than returned, and store-level errors are logged and recovered from.

use thiserror::Error;

/// Message delivered to observers when the user aborts a stream.
pub const CANCELLED_MESSAGE: &str = "Generation stopped";

/// Errors that terminate a streamed response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Network or HTTP failure before or during streaming.
    #[error("{0}")]
    Transport(String),

    /// A well-formed record that carried an `error` field.
    #[error("{0}")]
    Protocol(String),

    /// User-triggered abort.
    #[error("{}", CANCELLED_MESSAGE)]
    Cancelled,
}

impl StreamError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

/// A stream line that could not be parsed as a record.
///
/// Never surfaced to observers; consumers drop the line and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed stream record ({reason}): {line}")]
pub struct MalformedFragment {
    pub line: String,
    pub reason: String,
}

/// Errors raised while operating on the session collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Persisted session history is corrupt: {0}")]
    CorruptState(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        assert_eq!(StreamError::Cancelled.to_string(), "Generation stopped");
    }

    #[test]
    fn test_transport_and_protocol_pass_text_through() {
        assert_eq!(
            StreamError::Transport("connection refused".to_string()).to_string(),
            "connection refused"
        );
        assert_eq!(
            StreamError::Protocol("model 'x' not found".to_string()).to_string(),
            "model 'x' not found"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(StreamError::Cancelled.is_cancelled());
        assert!(!StreamError::Protocol("boom".to_string()).is_cancelled());
        assert!(!StreamError::Transport("boom".to_string()).is_cancelled());
    }
}
