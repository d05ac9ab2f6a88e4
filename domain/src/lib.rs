//! Domain layer for ollama-chat
//!
//! This crate contains the core entities and value objects of the chat
//! client. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Sessions
//!
//! A [`Session`] is one conversation thread: an ordered list of
//! [`Message`]s plus its title, model and timestamps. All sessions live in a
//! single [`SessionCollection`] that is persisted as one JSON document.
//!
//! ## Streaming
//!
//! Replies arrive as newline-delimited JSON. [`LineDecoder`] frames the
//! bytes into lines, [`StreamRecord`] classifies each line, and
//! [`StreamEvent`] is what observers of the stream see.

pub mod core;
pub mod protocol;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use core::{
    error::{CANCELLED_MESSAGE, MalformedFragment, StoreError, StreamError},
    model::{FALLBACK_MODEL, Model, ModelInfo},
};
pub use protocol::{
    ndjson::{DEFAULT_MAX_LINE_BYTES, LineDecoder},
    record::{ChatRequest, ContentRecord, ErrorRecord, ModelList, StreamRecord, WireMessage},
};
pub use session::{
    collection::SessionCollection,
    entities::{LEGACY_PLACEHOLDER_TITLE, Message, PLACEHOLDER_TITLE, Role, Session, TITLE_MAX_CHARS},
    export::{BundleMessage, ExportBundle},
    stream::StreamEvent,
};
