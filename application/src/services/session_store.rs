//! Session store: the single source of truth for chat history.
//!
//! [`SessionStore`] owns the [`SessionCollection`] and flushes it to a
//! [`KeyValueStore`] after every mutating operation, so a crash loses at
//! most the operation in flight. The one exception is
//! [`update_message_content`](SessionStore::update_message_content), the
//! per-token path used while a reply streams in; its caller flushes once
//! with [`persist`](SessionStore::persist) when the stream ends.
//!
//! Operations on unknown session ids are silent no-ops. Nothing here returns
//! an error to the caller: failures are classified as [`StoreError`], logged
//! and recovered from.

use crate::ports::storage::KeyValueStore;
use chat_domain::util::{now_millis, now_rfc3339};
use chat_domain::{ExportBundle, Message, Model, Session, SessionCollection, StoreError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Key under which the whole collection is persisted.
pub const STORAGE_KEY: &str = "ollama-chat-history";

/// What [`SessionStore::initialize`] found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Nothing was stored yet.
    Empty,
    /// A previous collection was loaded.
    Loaded { sessions: usize },
    /// Stored state was unreadable; started from an empty collection.
    Recovered(StoreError),
}

/// Owner of every session, persisted after each mutation.
pub struct SessionStore {
    state: SessionCollection,
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    /// An empty store backed by `storage`. Call [`initialize`](Self::initialize)
    /// to hydrate it.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: SessionCollection::new(),
            storage,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Persist under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Create and hydrate in one step.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> (Self, InitOutcome) {
        let mut store = Self::new(storage);
        let outcome = store.initialize();
        (store, outcome)
    }

    /// Load the persisted collection, falling back to empty.
    pub fn initialize(&mut self) -> InitOutcome {
        match self.load() {
            Ok(Some(state)) => {
                info!("Loaded {} sessions from storage", state.len());
                let sessions = state.len();
                self.state = state;
                InitOutcome::Loaded { sessions }
            }
            Ok(None) => {
                debug!("No stored sessions under '{}'", self.key);
                self.state = SessionCollection::new();
                InitOutcome::Empty
            }
            Err(e) => {
                warn!("{}; starting with an empty history", e);
                self.state = SessionCollection::new();
                InitOutcome::Recovered(e)
            }
        }
    }

    fn load(&self) -> Result<Option<SessionCollection>, StoreError> {
        let stored = self
            .storage
            .get(&self.key)
            .map_err(|e| StoreError::CorruptState(e.to_string()))?;

        match stored {
            None => Ok(None),
            Some(blob) if blob.trim().is_empty() => Ok(None),
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(|e| StoreError::CorruptState(e.to_string())),
        }
    }

    /// Write the whole collection to storage.
    pub fn try_persist(&self) -> Result<(), StoreError> {
        let blob =
            serde_json::to_string(&self.state).map_err(|e| StoreError::Storage(e.to_string()))?;
        self.storage
            .set(&self.key, &blob)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Write the whole collection to storage, logging any failure.
    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            error!("Failed to persist sessions: {}", e);
        }
    }

    fn ignored(operation: &str, session_id: &str) -> bool {
        debug!(
            "{} ignored: {}",
            operation,
            StoreError::NotFound(session_id.to_string())
        );
        false
    }

    // ==================== Mutations ====================

    /// Start a new session with the current default model and make it active.
    pub fn create_session(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), self.state.current_model.clone(), now_millis());
        info!("Creating session {}", id);
        self.state.insert_active(session);
        self.persist();
        id
    }

    /// Append a message; the first user message also names the session.
    ///
    /// Returns `false` when `session_id` does not resolve.
    pub fn append_message(&mut self, session_id: &str, message: Message) -> bool {
        match self.state.get_mut(session_id) {
            Some(session) => {
                session.push_message(message, now_millis());
                self.persist();
                true
            }
            None => Self::ignored("append_message", session_id),
        }
    }

    /// Patch a message in place while its reply is streaming.
    ///
    /// Neither bumps `last_update_time` nor persists; call
    /// [`persist`](Self::persist) once the stream ends.
    pub fn update_message_content(
        &mut self,
        session_id: &str,
        index: usize,
        content: impl Into<String>,
    ) -> bool {
        match self.state.get_mut(session_id) {
            Some(session) => session.set_message_content(index, content),
            None => Self::ignored("update_message_content", session_id),
        }
    }

    /// Delete a session for good.
    ///
    /// If it was active, the most recently created remaining session takes
    /// its place.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        match self.state.remove(session_id) {
            Some(_) => {
                info!("Deleted session {}", session_id);
                self.persist();
                true
            }
            None => Self::ignored("delete_session", session_id),
        }
    }

    pub fn update_session_model(&mut self, session_id: &str, model: Model) -> bool {
        match self.state.get_mut(session_id) {
            Some(session) => {
                session.set_model(model, now_millis());
                self.persist();
                true
            }
            None => Self::ignored("update_session_model", session_id),
        }
    }

    /// Make an existing session the active one.
    pub fn select_session(&mut self, session_id: &str) -> bool {
        if !self.state.contains(session_id) {
            return Self::ignored("select_session", session_id);
        }
        self.state.current_session_id = session_id.to_string();
        self.persist();
        true
    }

    /// Set the model new sessions start with.
    pub fn set_current_model(&mut self, model: Model) {
        self.state.current_model = model;
        self.persist();
    }

    /// Create a session from an exported bundle and make it active.
    ///
    /// Messages without a timestamp get the import time.
    pub fn import_session(&mut self, bundle: ExportBundle) -> String {
        let now = now_millis();
        let id = uuid::Uuid::new_v4().to_string();
        let model = bundle
            .model
            .unwrap_or_else(|| self.state.current_model.clone());
        let messages = bundle
            .messages
            .into_iter()
            .map(|m| m.into_message(now))
            .collect();

        let session = Session::restored(id.clone(), bundle.title, model, messages, now);
        info!("Imported session {} ({} messages)", id, session.messages().len());
        self.state.insert_active(session);
        self.persist();
        id
    }

    // ==================== Queries ====================

    /// Build a portable bundle for a session. Does not mutate anything.
    pub fn export_session(&self, session_id: &str) -> Option<ExportBundle> {
        self.state
            .get(session_id)
            .map(|s| ExportBundle::from_session(s, now_rfc3339()))
    }

    pub fn collection(&self) -> &SessionCollection {
        &self.state
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.state.get(session_id)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.state.current()
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.state.current().map(|s| s.id())
    }

    pub fn current_model(&self) -> &Model {
        &self.state.current_model
    }

    /// Sessions newest-updated first.
    pub fn sorted_sessions(&self) -> Vec<&Session> {
        self.state.sorted_by_last_update()
    }
}
