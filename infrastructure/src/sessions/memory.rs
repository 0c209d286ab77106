//! In-process session store.

use super::SessionStoreError;
use async_trait::async_trait;
use crossdesk_domain::{SessionId, SessionRepository, SessionSnapshot};
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps suspended sessions in a map. Used by chat mode, where the process
/// outlives the follow-up, and by tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionSnapshot>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    type Error = SessionStoreError;

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        sessions.insert(snapshot.id.as_str().to_string(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, Self::Error> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), Self::Error> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::Poisoned)?;
        sessions.remove(id.as_str());
        Ok(())
    }
}
