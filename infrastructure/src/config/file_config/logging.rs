//! Logging configuration from TOML (`[logging]` section)

use super::storage::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Diagnostic log file; stderr only when unset
    pub log_file: Option<String>,
    /// JSONL transcript of conversation events
    pub conversation_log: Option<String>,
}

impl FileLoggingConfig {
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand_home)
    }

    pub fn conversation_log(&self) -> Option<PathBuf> {
        self.conversation_log.as_deref().map(expand_home)
    }
}
