//! Core services shared by every use case.
//!
//! - [`stream_consumer::StreamConsumer`]: turns a chunked NDJSON body into
//!   ordered stream callbacks
//! - [`session_store::SessionStore`]: owns and persists all sessions

pub mod session_store;
pub mod stream_consumer;
