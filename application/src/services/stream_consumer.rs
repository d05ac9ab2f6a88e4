//! Streaming response assembler.
//!
//! [`StreamConsumer`] drives a chunked NDJSON body from the endpoint to
//! completion and reports what it finds through a [`StreamObserver`]:
//!
//! ```text
//! bytes ──► LineDecoder ──► StreamRecord::parse ──► on_delta / on_error / on_done
//! ```
//!
//! The only suspension point is the wait for the next chunk. That wait
//! races the caller's [`CancellationToken`], so a cancelled stream is
//! abandoned without waiting for the server to send anything else.

use crate::config::StreamSettings;
use crate::ports::llm_gateway::GatewayError;
use crate::ports::stream_observer::StreamObserver;
use chat_domain::{LineDecoder, MalformedFragment, StreamError, StreamRecord};
use futures::{Stream, StreamExt};
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How a consumed stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The transport closed cleanly; `on_done` fired.
    Completed,
    /// A transport or protocol error ended the stream; `on_error` fired.
    Failed(StreamError),
    /// The caller cancelled; `on_error` fired with [`StreamError::Cancelled`].
    Cancelled,
}

impl StreamOutcome {
    /// The outcome matching a terminal error.
    pub fn from_error(error: StreamError) -> Self {
        if error.is_cancelled() {
            StreamOutcome::Cancelled
        } else {
            StreamOutcome::Failed(error)
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed)
    }

    pub fn error(&self) -> Option<StreamError> {
        match self {
            StreamOutcome::Completed => None,
            StreamOutcome::Failed(e) => Some(e.clone()),
            StreamOutcome::Cancelled => Some(StreamError::Cancelled),
        }
    }
}

/// Consumes one streamed reply end to end.
///
/// Holds only configuration; nothing carries over between calls to
/// [`consume`](Self::consume).
#[derive(Debug, Clone, Default)]
pub struct StreamConsumer {
    settings: StreamSettings,
}

/// Per-call bookkeeping.
#[derive(Default)]
struct ConsumeState {
    deltas: usize,
    malformed_run: usize,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StreamSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// Drive `stream` to its end, reporting through `observer`.
    ///
    /// Exactly one of `on_done` / `on_error` fires per call. `on_delta`
    /// fires once per content record, in stream order, regardless of the
    /// record's `done` flag; only the transport closing ends the reply.
    pub async fn consume<S, B, O>(
        &self,
        stream: S,
        observer: &mut O,
        cancellation: &CancellationToken,
    ) -> StreamOutcome
    where
        S: Stream<Item = Result<B, GatewayError>>,
        B: AsRef<[u8]>,
        O: StreamObserver + ?Sized,
    {
        futures::pin_mut!(stream);
        let mut decoder = LineDecoder::with_max_line_bytes(self.settings.max_line_bytes);
        let mut state = ConsumeState::default();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!("Stream cancelled after {} deltas", state.deltas);
                    return Self::fail(observer, StreamError::Cancelled);
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    let chunk = chunk.as_ref();
                    trace!("Stream chunk: {} bytes", chunk.len());
                    decoder.push(chunk);
                    while let Some(line) = decoder.next_line() {
                        let flow = match line {
                            Ok(line) => self.handle_line(&line, observer, &mut state),
                            Err(oversized) => self.handle_malformed(oversized, observer, &mut state),
                        };
                        if let ControlFlow::Break(outcome) = flow {
                            return outcome;
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("Transport failed mid-stream: {}", e);
                    return Self::fail(observer, StreamError::Transport(e.to_string()));
                }
                None => {
                    if let Some(line) = decoder.finish()
                        && let ControlFlow::Break(outcome) =
                            self.handle_line(&line, observer, &mut state)
                    {
                        return outcome;
                    }
                    debug!("Stream complete ({} deltas)", state.deltas);
                    observer.on_done();
                    return StreamOutcome::Completed;
                }
            }
        }
    }

    fn handle_line<O>(
        &self,
        line: &str,
        observer: &mut O,
        state: &mut ConsumeState,
    ) -> ControlFlow<StreamOutcome>
    where
        O: StreamObserver + ?Sized,
    {
        match StreamRecord::parse(line) {
            Ok(StreamRecord::Error(record)) => {
                debug!("Endpoint reported error: {}", record.error);
                ControlFlow::Break(Self::fail(observer, StreamError::Protocol(record.error)))
            }
            Ok(StreamRecord::Content(record)) => {
                state.malformed_run = 0;
                state.deltas += 1;
                if record.done {
                    trace!("Final record received from {:?}", record.model);
                }
                observer.on_delta(&record.message.content);
                ControlFlow::Continue(())
            }
            Ok(StreamRecord::Unrecognized(_)) => {
                trace!("Skipping non-content stream line");
                ControlFlow::Continue(())
            }
            Err(malformed) => self.handle_malformed(malformed, observer, state),
        }
    }

    fn handle_malformed<O>(
        &self,
        malformed: MalformedFragment,
        observer: &mut O,
        state: &mut ConsumeState,
    ) -> ControlFlow<StreamOutcome>
    where
        O: StreamObserver + ?Sized,
    {
        debug!("Dropping stream line: {}", malformed);
        state.malformed_run += 1;
        match self.settings.max_consecutive_malformed {
            Some(limit) if state.malformed_run > limit => {
                warn!("Giving up after {} malformed stream lines", state.malformed_run);
                ControlFlow::Break(Self::fail(
                    observer,
                    StreamError::Protocol("too many malformed stream records".to_string()),
                ))
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn fail<O>(observer: &mut O, error: StreamError) -> StreamOutcome
    where
        O: StreamObserver + ?Sized,
    {
        observer.on_error(&error);
        StreamOutcome::from_error(error)
    }
}
