//! Directory-backed session store.
//!
//! One JSON file per suspended session, named by its ID. A session handed
//! out by `crossdesk query` survives until `crossdesk resume` picks it up,
//! process restarts included.

use super::SessionStoreError;
use async_trait::async_trait;
use crossdesk_domain::{SessionId, SessionRepository, SessionSnapshot};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Opens the store, creating the directory when missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Session IDs name files directly, so anything that could walk out of
    /// the directory is rejected before it touches the filesystem.
    fn path_for(&self, id: &SessionId) -> Result<PathBuf, SessionStoreError> {
        let name = id.as_str();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SessionStoreError::InvalidId(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

#[async_trait]
impl SessionRepository for FileSessionStore {
    type Error = SessionStoreError;

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        let path = self.path_for(&snapshot.id)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)?;
        debug!(session = %snapshot.id, path = %path.display(), "session saved");
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, Self::Error> {
        let path = self.path_for(id)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn delete(&self, id: &SessionId) -> Result<(), Self::Error> {
        let path = self.path_for(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossdesk_domain::{AgentRole, ExecutionContext, QueryIntent, resolve};
    use crossdesk_domain::{EngineState, EntityField, MissingFieldRequest};
    use tempfile::TempDir;

    fn snapshot(id: &str) -> SessionSnapshot {
        let intent = QueryIntent::new("was my refund processed")
            .with_agent(AgentRole::Order)
            .with_agent(AgentRole::Payment);
        let context = ExecutionContext::for_intent(&intent);
        let plan = resolve(&intent).unwrap();
        let state = EngineState::AwaitingInput {
            step: 0,
            total: plan.len(),
            request: MissingFieldRequest::new(AgentRole::Payment, EntityField::PaymentMethodId),
        };
        SessionSnapshot::new(SessionId::new(id), intent, context, plan, state)
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        let snapshot = snapshot("abc-123");

        store.save(&snapshot).await.unwrap();
        assert!(dir.path().join("abc-123.json").exists());

        let loaded = store.load(&SessionId::new("abc-123")).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_delete_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        store.save(&snapshot("abc-123")).await.unwrap();

        store.delete(&SessionId::new("abc-123")).await.unwrap();
        assert!(!dir.path().join("abc-123.json").exists());

        // Missing files do not fail the delete.
        store.delete(&SessionId::new("abc-123")).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        assert!(store.load(&SessionId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_traversal_ids_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();

        let err = store.load(&SessionId::new("../escape")).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_store_creates_its_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sessions").join("deep");
        let store = FileSessionStore::new(&nested).unwrap();
        store.save(&snapshot("abc")).await.unwrap();
        assert!(nested.join("abc.json").exists());
    }
}
