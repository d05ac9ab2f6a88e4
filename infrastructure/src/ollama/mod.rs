//! Ollama HTTP adapter
//!
//! Implements [`LlmGateway`](chat_application::LlmGateway) against the
//! `/api/chat` and `/api/tags` endpoints of a local Ollama server.

pub mod gateway;

pub use gateway::{DEFAULT_BASE_URL, OllamaGateway};
