//! Observer port for a streaming reply.
//!
//! Stream-level failures are never returned as `Err` across the consumer
//! boundary; they arrive through [`StreamObserver::on_error`] so a front end
//! can render them inline with the partial reply.

use chat_domain::{StreamError, StreamEvent};

/// Callbacks fired while a reply streams in.
///
/// For one stream, `on_delta` fires zero or more times in record order,
/// then exactly one of `on_done` or `on_error`.
pub trait StreamObserver {
    /// A text fragment of the reply.
    fn on_delta(&mut self, fragment: &str);

    /// The stream failed, or was cancelled.
    fn on_error(&mut self, error: &StreamError);

    /// The transport closed cleanly.
    fn on_done(&mut self);
}

/// No-op implementation for callers that only need the stored result.
pub struct NoStreamObserver;

impl StreamObserver for NoStreamObserver {
    fn on_delta(&mut self, _fragment: &str) {}
    fn on_error(&mut self, _error: &StreamError) {}
    fn on_done(&mut self) {}
}

/// Records every callback as a [`StreamEvent`].
#[derive(Debug, Default)]
pub struct StreamEventCollector {
    pub events: Vec<StreamEvent>,
}

impl StreamEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenation of every delta seen so far.
    pub fn text(&self) -> String {
        self.events.iter().filter_map(StreamEvent::text).collect()
    }

    pub fn deltas(&self) -> Vec<&str> {
        self.events.iter().filter_map(StreamEvent::text).collect()
    }

    pub fn errors(&self) -> Vec<&StreamError> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Error(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn done_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Done))
            .count()
    }
}

impl StreamObserver for StreamEventCollector {
    fn on_delta(&mut self, fragment: &str) {
        self.events.push(StreamEvent::Delta(fragment.to_string()));
    }

    fn on_error(&mut self, error: &StreamError) {
        self.events.push(StreamEvent::Error(error.clone()));
    }

    fn on_done(&mut self) {
        self.events.push(StreamEvent::Done);
    }
}
