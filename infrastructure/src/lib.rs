//! Infrastructure layer for ollama-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod export;
pub mod logging;
pub mod ollama;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use export::FileExportSink;
pub use logging::JsonlConversationLogger;
pub use ollama::{DEFAULT_BASE_URL, OllamaGateway};
pub use storage::JsonFileStore;
