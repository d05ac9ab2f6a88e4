//! Wire records exchanged with the chat endpoint.
//!
//! The streaming chat call answers with one JSON object per line, each of
//! which is either a content record or an error record:
//!
//! ```text
//! {"model":"llama3","created_at":"…","message":{"role":"assistant","content":"Hel"},"done":false}
//! {"error":"model 'llama9' not found"}
//! ```

use crate::core::error::MalformedFragment;
use crate::core::model::{Model, ModelInfo};
use crate::session::entities::{Message, Role};
use serde::{Deserialize, Serialize};

/// `{role, content}` as sent to and received from the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Request body for the chat call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a request from a conversation history.
    pub fn new<'a>(
        model: &Model,
        history: impl IntoIterator<Item = &'a Message>,
        stream: bool,
    ) -> Self {
        Self {
            model: model.as_str().to_string(),
            messages: history.into_iter().map(WireMessage::from).collect(),
            stream,
        }
    }

    /// The last user prompt, if any.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User.as_str())
            .map(|m| m.content.as_str())
    }
}

/// A content record: one fragment of the assistant reply.
///
/// The non-streaming chat call answers with a single record of this shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRecord {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub message: WireMessage,
    #[serde(default)]
    pub done: bool,
}

/// An error record reported in-band by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
}

/// One line of a streamed chat response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StreamRecord {
    Error(ErrorRecord),
    Content(ContentRecord),
    /// Valid JSON of any other shape, such as status lines.
    Unrecognized(serde_json::Value),
}

impl StreamRecord {
    /// Parse one trimmed, non-empty line.
    ///
    /// Only text that is not JSON at all is a [`MalformedFragment`].
    pub fn parse(line: &str) -> Result<Self, MalformedFragment> {
        serde_json::from_str(line).map_err(|e| MalformedFragment {
            line: line.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Response body of the model-listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_record() {
        let record = StreamRecord::parse(
            r#"{"model":"llama3","created_at":"2024-01-01T00:00:00Z","message":{"role":"assistant","content":"Hel"},"done":false}"#,
        )
        .unwrap();
        match record {
            StreamRecord::Content(c) => {
                assert_eq!(c.message.content, "Hel");
                assert_eq!(c.model.as_deref(), Some("llama3"));
                assert!(!c.done);
            }
            other => panic!("expected content record, got {:?}", other),
        }
    }

    #[test]
    fn parses_error_record() {
        let record = StreamRecord::parse(r#"{"error":"model not found"}"#).unwrap();
        assert_eq!(
            record,
            StreamRecord::Error(ErrorRecord {
                error: "model not found".to_string()
            })
        );
    }

    #[test]
    fn error_field_wins_over_content_shape() {
        let record =
            StreamRecord::parse(r#"{"error":"boom","message":{"role":"assistant","content":"x"}}"#)
                .unwrap();
        assert!(matches!(record, StreamRecord::Error(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(StreamRecord::parse(r#"{"message":{"content":"#).is_err());
        let err = StreamRecord::parse("not json").unwrap_err();
        assert_eq!(err.line, "not json");
    }

    #[test]
    fn other_json_shapes_are_unrecognized() {
        assert_eq!(
            StreamRecord::parse(r#"{"status":"loading"}"#).unwrap(),
            StreamRecord::Unrecognized(serde_json::json!({"status": "loading"}))
        );
        assert!(matches!(
            StreamRecord::parse("[1,2]").unwrap(),
            StreamRecord::Unrecognized(_)
        ));
    }

    #[test]
    fn request_serializes_expected_shape() {
        let history = vec![Message::user("Hi", 1), Message::assistant("Hello", 2)];
        let request = ChatRequest::new(&Model::new("llama3"), &history, true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama3",
                "messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello"}
                ],
                "stream": true
            })
        );
        assert_eq!(request.last_user_content(), Some("Hi"));
    }

    #[test]
    fn parses_model_list() {
        let list: ModelList =
            serde_json::from_str(r#"{"models":[{"name":"llama3"},{"name":"mistral","size":1}]}"#)
                .unwrap();
        assert_eq!(list.models.len(), 2);
        assert_eq!(list.models[1].name, "mistral");
    }
}
