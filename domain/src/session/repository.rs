//! Session snapshot repository trait

use crate::session::snapshot::{SessionId, SessionSnapshot};
use async_trait::async_trait;

/// Repository trait for suspended session snapshots.
///
/// This is a domain-level abstraction that defines how snapshots are
/// stored and recovered. Implementations live in the infrastructure layer.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Error type for repository operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a snapshot, replacing any existing one with the same ID
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Load a snapshot by ID, or None when no such session exists
    async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Remove a snapshot once its session completed or failed
    async fn delete(&self, id: &SessionId) -> Result<(), Self::Error>;
}
