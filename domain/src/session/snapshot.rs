//! Suspended query sessions.
//!
//! When a run blocks on a follow-up question, everything needed to resume
//! it later is captured here. Snapshots serialize cleanly so a session
//! can survive a process restart.

use crate::agent::AgentRole;
use crate::orchestration::context::ExecutionContext;
use crate::orchestration::machine::EngineState;
use crate::orchestration::resolver::ExecutionPlan;
use crate::query::QueryIntent;
use serde::{Deserialize, Serialize};

/// Unique identifier for a suspended session.
///
/// Handed to the customer alongside the follow-up question; resuming
/// requires presenting it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique SessionId using a UUID-like format.
    pub fn generate() -> Self {
        Self(uuid_v4())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full resumable state of a suspended query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub intent: QueryIntent,
    pub context: ExecutionContext,
    /// The plan suffix still to run; the blocked step comes first.
    pub remaining: ExecutionPlan,
    pub state: EngineState,
    /// Roles that have used their one follow-up question.
    #[serde(default)]
    pub retried: Vec<AgentRole>,
    pub updated_at_ms: u64,
}

impl SessionSnapshot {
    pub fn new(
        id: SessionId,
        intent: QueryIntent,
        context: ExecutionContext,
        remaining: ExecutionPlan,
        state: EngineState,
    ) -> Self {
        Self {
            id,
            intent,
            context,
            remaining,
            state,
            retried: Vec::new(),
            updated_at_ms: current_timestamp(),
        }
    }

    /// Marks a role as having received its follow-up.
    pub fn mark_retried(&mut self, role: AgentRole) {
        if !self.retried.contains(&role) {
            self.retried.push(role);
        }
    }

    pub fn was_retried(&self, role: AgentRole) -> bool {
        self.retried.contains(&role)
    }

    /// Refreshes the last-updated stamp.
    pub fn touch(&mut self) {
        self.updated_at_ms = current_timestamp();
    }
}

/// Generate a simple UUID v4 (without external dependency)
fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    // Simple pseudo-random based on time
    let nanos = now.as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos >> 96) as u32,
        (nanos >> 80) as u16,
        (nanos >> 64) as u16 & 0x0fff,
        ((nanos >> 48) as u16 & 0x3fff) | 0x8000,
        (nanos & 0xffffffffffff) as u64
    )
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
