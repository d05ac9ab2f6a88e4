//! Chat session domain.
//!
//! - [`entities::Session`]: one conversation thread
//! - [`entities::Message`]: a single message within a session
//! - [`collection::SessionCollection`]: every session plus the active pointer
//! - [`export::ExportBundle`]: the portable export format
//! - [`stream::StreamEvent`]: transient events while a reply streams in

pub mod collection;
pub mod entities;
pub mod export;
pub mod stream;
