//! Session domain entities

use crate::core::model::Model;
use crate::core::string::truncate_chars;
use serde::{Deserialize, Serialize};

/// Title every session starts with until its first user message arrives.
pub const PLACEHOLDER_TITLE: &str = "New conversation";

/// Placeholder written by earlier clients into the same history file.
pub const LEGACY_PLACEHOLDER_TITLE: &str = "新对话";

/// Maximum number of characters kept when deriving a title.
pub const TITLE_MAX_CHARS: usize = 20;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self::new(Role::User, content, timestamp)
    }

    pub fn assistant(content: impl Into<String>, timestamp: i64) -> Self {
        Self::new(Role::Assistant, content, timestamp)
    }
}

/// Derive a session title from the first user message.
pub fn derive_title(content: &str) -> String {
    truncate_chars(content, TITLE_MAX_CHARS)
}

/// One persisted conversation thread (Entity)
///
/// The id never changes. `last_update_time` follows every mutation of the
/// message list or the model name, except in-place content patches made
/// while a reply is streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: String,
    title: String,
    messages: Vec<Message>,
    model_name: Model,
    create_time: i64,
    last_update_time: i64,
}

impl Session {
    /// A fresh session with the placeholder title and no messages.
    pub fn new(id: impl Into<String>, model: Model, now: i64) -> Self {
        Self {
            id: id.into(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            model_name: model,
            create_time: now,
            last_update_time: now,
        }
    }

    /// A session rebuilt from previously exported content.
    pub fn restored(
        id: impl Into<String>,
        title: impl Into<String>,
        model: Model,
        messages: Vec<Message>,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages,
            model_name: model,
            create_time: now,
            last_update_time: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn model(&self) -> &Model {
        &self.model_name
    }

    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    pub fn last_update_time(&self) -> i64 {
        self.last_update_time
    }

    pub fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE || self.title == LEGACY_PLACEHOLDER_TITLE
    }

    /// Append a message and retitle the session on its first user message.
    pub fn push_message(&mut self, message: Message, now: i64) {
        if self.has_placeholder_title() && message.role == Role::User {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.touch(now);
    }

    /// Replace the content of the message at `index`.
    ///
    /// Returns `false` when there is no such message. Leaves
    /// `last_update_time` alone.
    pub fn set_message_content(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.messages.get_mut(index) {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn set_model(&mut self, model: Model, now: i64) {
        self.model_name = model;
        self.touch(now);
    }

    fn touch(&mut self, now: i64) {
        self.last_update_time = self.last_update_time.max(now);
    }
}
