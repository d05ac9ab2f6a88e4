//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Where chat history is kept (default: platform data dir)
    pub data_dir: Option<String>,
    /// Where exports are written (default: current directory)
    pub export_dir: Option<String>,
}

impl FileStorageConfig {
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(expand_home)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
