//! Endpoint wire protocol.
//!
//! - [`record`]: request/response records of the chat and model-listing calls
//! - [`ndjson`]: line framing for the streamed chat response

pub mod ndjson;
pub mod record;
