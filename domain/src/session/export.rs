//! Portable export format for a single session

use super::entities::{Message, Role, Session};
use crate::core::model::Model;
use crate::util::sanitize_file_name;
use serde::{Deserialize, Serialize};

/// A message as it appears in an export bundle.
///
/// Bundles written by other tools may omit the timestamp; a missing or zero
/// timestamp is replaced on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl BundleMessage {
    /// Convert to a stored message, stamping `fallback` if no usable time is present.
    pub fn into_message(self, fallback: i64) -> Message {
        let timestamp = match self.timestamp {
            Some(ts) if ts != 0 => ts,
            _ => fallback,
        };
        Message::new(self.role, self.content, timestamp)
    }
}

impl From<&Message> for BundleMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp: Some(message.timestamp),
        }
    }
}

/// `{title, model, messages, exportTime}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(default)]
    pub messages: Vec<BundleMessage>,
    #[serde(default)]
    pub export_time: String,
}

impl ExportBundle {
    pub fn from_session(session: &Session, export_time: impl Into<String>) -> Self {
        Self {
            title: session.title().to_string(),
            model: Some(session.model().clone()),
            messages: session.messages().iter().map(BundleMessage::from).collect(),
            export_time: export_time.into(),
        }
    }

    /// `<title>-<exportTime>.json`, made safe for a file system.
    pub fn suggested_file_name(&self) -> String {
        sanitize_file_name(&format!("{}-{}.json", self.title, self.export_time))
    }
}
