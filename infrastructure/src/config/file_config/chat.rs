//! Chat configuration from TOML (`[chat]` and `[stream]` sections)

use chat_application::config::{BehaviorConfig, StreamSettings};
use chat_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Model for new sessions when none has been picked yet
    pub default_model: Option<String>,
    /// Request streamed replies
    pub stream: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            stream: true,
        }
    }
}

impl FileChatConfig {
    pub fn default_model(&self) -> Option<Model> {
        self.default_model
            .as_deref()
            .map(Model::new)
            .filter(|m| !m.is_unset())
    }
}

/// Raw stream consumption configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Consecutive unparseable lines tolerated before giving up; 0 disables the cap
    pub max_consecutive_malformed: usize,
    /// Longest stream line buffered before it is dropped as malformed
    pub max_line_bytes: usize,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self {
            max_consecutive_malformed: chat_application::DEFAULT_MAX_CONSECUTIVE_MALFORMED,
            max_line_bytes: chat_domain::DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl FileStreamConfig {
    pub fn to_settings(&self) -> StreamSettings {
        StreamSettings {
            max_consecutive_malformed: match self.max_consecutive_malformed {
                0 => None,
                n => Some(n),
            },
            max_line_bytes: self.max_line_bytes,
        }
    }
}

/// Combine `[chat]` and `[stream]` into the application's behavior settings.
pub fn behavior(chat: &FileChatConfig, stream: &FileStreamConfig) -> BehaviorConfig {
    BehaviorConfig {
        stream: chat.stream,
        stream_settings: stream.to_settings(),
    }
}
