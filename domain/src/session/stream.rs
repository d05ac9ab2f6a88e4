//! Streaming events for a chat response.
//!
//! [`StreamEvent`] is the transient unit produced while a reply streams in.
//! Events are handed to whoever is observing the stream and never stored.

use crate::core::error::StreamError;

/// An event in a streaming chat response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment of the in-progress assistant message.
    Delta(String),
    /// The transport closed cleanly.
    Done,
    /// The stream ended in failure or was cancelled.
    Error(StreamError),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}
