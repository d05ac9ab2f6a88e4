//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section and field is optional; missing values take the defaults
//! below.
//!
//! ```toml
//! [endpoint]
//! base_url = "http://localhost:11434"
//! timeout_seconds = 30
//!
//! [chat]
//! default_model = "llama3"
//! stream = true
//!
//! [storage]
//! data_dir = "~/.local/share/ollama-chat"
//! export_dir = "~/Downloads"
//!
//! [stream]
//! max_consecutive_malformed = 1000
//! max_line_bytes = 4194304
//!
//! [logging]
//! log_file = "~/.local/state/ollama-chat/ollama-chat.log"
//! conversation_log = "~/.local/state/ollama-chat/conversation.jsonl"
//!
//! [repl]
//! show_progress = true
//! history_file = "~/.ollama_chat_history"
//! ```

mod chat;
mod endpoint;
mod logging;
mod repl;
mod storage;

pub use chat::{FileChatConfig, FileStreamConfig, behavior};
pub use endpoint::{DEFAULT_TIMEOUT_SECONDS, FileEndpointConfig};
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use storage::{FileStorageConfig, expand_home};

use chat_application::config::BehaviorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("endpoint.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("endpoint.base_url must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("chat.default_model cannot be empty")]
    EmptyModelName,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: FileEndpointConfig,
    pub chat: FileChatConfig,
    pub storage: FileStorageConfig,
    pub stream: FileStreamConfig,
    pub logging: FileLoggingConfig,
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Check the values serde cannot, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.endpoint.timeout_seconds == Some(0) {
            issues.push(ConfigValidationError::InvalidTimeout);
        }

        let url = self.endpoint.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(ConfigValidationError::InvalidBaseUrl(url.to_string()));
        }

        if let Some(model) = &self.chat.default_model
            && model.trim().is_empty()
        {
            issues.push(ConfigValidationError::EmptyModelName);
        }

        issues
    }

    /// Application behavior derived from `[chat]` and `[stream]`.
    pub fn behavior(&self) -> BehaviorConfig {
        behavior(&self.chat, &self.stream)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
