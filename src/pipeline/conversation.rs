use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{ChatTurn, Role};
use super::PipelineError;

/// Ordered turns of one conversation. Append-only.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: &str) {
        self.turns.push(ChatTurn::new(role, content));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// In-memory conversations keyed by session id.
///
/// Each history has its own lock. Callers lock only to append or copy
/// turns, never across a knowledge or LLM call, so two concurrent requests
/// on the same session can interleave their turns. Histories live until
/// the process exits and are never evicted, so every request that arrives
/// without a session id adds one more entry to the map.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<ChatHistory>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `session_id`, created empty on first use.
    pub fn session(&self, session_id: &str) -> Result<Arc<Mutex<ChatHistory>>, PipelineError> {
        let mut sessions = self.sessions.lock().map_err(|_| PipelineError::LockPoisoned)?;
        Ok(sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ChatHistory::new())))
            .clone())
    }

    /// Copy of a session's turns. Unknown sessions are empty and are not
    /// created.
    pub fn snapshot(&self, session_id: &str) -> Result<Vec<ChatTurn>, PipelineError> {
        let history = {
            let sessions = self.sessions.lock().map_err(|_| PipelineError::LockPoisoned)?;
            match sessions.get(session_id) {
                Some(history) => history.clone(),
                None => return Ok(Vec::new()),
            }
        };
        let guard = lock(&history)?;
        Ok(guard.turns().to_vec())
    }

    pub fn session_count(&self) -> Result<usize, PipelineError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| PipelineError::LockPoisoned)?
            .len())
    }
}

pub(crate) fn lock(history: &Mutex<ChatHistory>) -> Result<MutexGuard<'_, ChatHistory>, PipelineError> {
    history.lock().map_err(|_| PipelineError::LockPoisoned)
}
