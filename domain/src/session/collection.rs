//! The process-wide set of sessions and its persisted shape

use super::entities::Session;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// All sessions plus the active-session pointer and the default model.
///
/// `current_session_id` is empty when no session is active. Physical order
/// of `sessions` carries no meaning; use [`sorted_by_last_update`](Self::sorted_by_last_update)
/// for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCollection {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub current_session_id: String,
    #[serde(default)]
    pub current_model: Model,
}

impl SessionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The active session, if the pointer resolves.
    pub fn current(&self) -> Option<&Session> {
        if self.current_session_id.is_empty() {
            return None;
        }
        self.get(&self.current_session_id)
    }

    /// Add a session and make it the active one.
    pub fn insert_active(&mut self, session: Session) {
        self.current_session_id = session.id().to_string();
        self.sessions.push(session);
    }

    /// Remove a session.
    ///
    /// When the removed session was active, the most recently created of the
    /// remaining sessions becomes active, or none if the collection is empty.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id() == id)?;
        let removed = self.sessions.remove(index);

        if self.current_session_id == id {
            self.current_session_id = self
                .sessions
                .iter()
                .max_by_key(|s| s.create_time())
                .map(|s| s.id().to_string())
                .unwrap_or_default();
        }

        Some(removed)
    }

    /// Sessions ordered by `last_update_time`, newest first.
    pub fn sorted_by_last_update(&self) -> Vec<&Session> {
        let mut sorted: Vec<&Session> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.last_update_time().cmp(&a.last_update_time()));
        sorted
    }

    /// Equality that ignores the physical order of `sessions`.
    pub fn same_contents(&self, other: &SessionCollection) -> bool {
        self.current_session_id == other.current_session_id
            && self.current_model == other.current_model
            && self.sessions.len() == other.sessions.len()
            && self
                .sessions
                .iter()
                .all(|s| other.get(s.id()).is_some_and(|o| o == s))
    }
}
