//! Presentation layer for ollama-chat
//!
//! This crate contains CLI definitions, console output, the streaming
//! reply printer and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, reply_model, resolve_session, run_turn};
pub use cli::commands::{Cli, Command, SessionsCommand};
pub use output::console::ConsoleFormatter;
pub use progress::StreamPrinter;
