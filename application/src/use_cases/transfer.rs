//! Export and import of single sessions
//!
//! A session leaves the application as a pretty-printed [`ExportBundle`]
//! and comes back in through the same format.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::export_sink::{ExportSink, ExportSinkError};
use crate::services::session_store::SessionStore;
use chat_domain::ExportBundle;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] ExportSinkError),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Not a valid session export: {0}")]
    InvalidBundle(String),
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub location: String,
    pub bundle: ExportBundle,
}

/// Use case for exporting a session through an [`ExportSink`].
pub struct ExportSessionUseCase {
    sink: Arc<dyn ExportSink>,
}

impl ExportSessionUseCase {
    pub fn new(sink: Arc<dyn ExportSink>) -> Self {
        Self { sink }
    }

    pub fn execute(&self, store: &SessionStore, session_id: &str) -> Result<ExportOutput, ExportError> {
        let bundle = store
            .export_session(session_id)
            .ok_or_else(|| ExportError::NotFound(session_id.to_string()))?;
        let bytes = serde_json::to_vec_pretty(&bundle)?;
        let location = self.sink.save(&bytes, &bundle.suggested_file_name())?;
        info!("Exported session {} to {}", session_id, location);
        Ok(ExportOutput { location, bundle })
    }
}

/// Use case for importing a previously exported session.
pub struct ImportSessionUseCase {
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Default for ImportSessionUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSessionUseCase {
    pub fn new() -> Self {
        Self {
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Parse `bytes` as a bundle and add it to `store` as the active
    /// session. Returns the new session id.
    pub fn execute(&self, store: &mut SessionStore, bytes: &[u8]) -> Result<String, ImportError> {
        let bundle: ExportBundle =
            serde_json::from_slice(bytes).map_err(|e| ImportError::InvalidBundle(e.to_string()))?;
        let messages = bundle.messages.len();
        let id = store.import_session(bundle);

        self.conversation_logger.log(ConversationEvent::new(
            "session_imported",
            serde_json::json!({
                "session_id": id,
                "messages": messages,
            }),
        ));
        Ok(id)
    }
}
