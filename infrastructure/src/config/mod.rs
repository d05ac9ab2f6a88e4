//! Configuration file loading for ollama-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `OLLAMA_CHAT_*` environment variables (`OLLAMA_CHAT_ENDPOINT__BASE_URL`, ...)
//! 2. `--config <path>` specified file
//! 3. Project root: `./ollama-chat.toml` or `./.ollama-chat.toml`
//! 4. Global: `~/.config/ollama-chat/config.toml` (or the platform config dir)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_TIMEOUT_SECONDS, FileChatConfig, FileConfig,
    FileEndpointConfig, FileLoggingConfig, FileReplConfig, FileStorageConfig, FileStreamConfig,
    expand_home,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
