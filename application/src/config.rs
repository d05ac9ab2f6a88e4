//! Application-level configuration.
//!
//! These types control how the stream consumer and the send-message flow
//! behave. They are filled in from the config file by the infrastructure
//! layer.

use chat_domain::DEFAULT_MAX_LINE_BYTES;

/// Default cap on consecutive unparseable stream lines.
pub const DEFAULT_MAX_CONSECUTIVE_MALFORMED: usize = 1000;

/// Stream consumption settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Give up after this many malformed lines in a row. `None` tolerates
    /// any number, which lets a corrupt stream spin until the transport
    /// closes.
    pub max_consecutive_malformed: Option<usize>,
    /// Longest stream line buffered before it is dropped as malformed.
    pub max_line_bytes: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            max_consecutive_malformed: Some(DEFAULT_MAX_CONSECUTIVE_MALFORMED),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Ask the endpoint for a streamed reply.
    pub stream: bool,
    pub stream_settings: StreamSettings,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            stream: true,
            stream_settings: StreamSettings::default(),
        }
    }
}
