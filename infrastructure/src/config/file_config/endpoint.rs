//! Endpoint configuration from TOML (`[endpoint]` section)

use crate::ollama::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw endpoint configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Connect timeout, also applied to non-streaming calls
    pub timeout_seconds: Option<u64>,
}

impl Default for FileEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl FileEndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
