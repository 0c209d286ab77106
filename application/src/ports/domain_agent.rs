//! Domain agent port.
//!
//! Each desk agent fronts one backing store. The engine only ever talks
//! to them through this port: an operation name plus the entity fields
//! known so far, an [`AgentResult`] back. Agents never reach into each
//! other's stores; anything they need from a peer arrives as a field in
//! `params`.

use async_trait::async_trait;
use crossdesk_domain::{AgentResult, AgentRole, EntityField, Operation};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors a desk agent can report.
///
/// "No matching rows" is not an error; that comes back as a successful
/// [`AgentResult`] with NotFound status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Backing store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Malformed parameter: {0}")]
    MalformedParams(String),

    #[error("Agent timed out")]
    Timeout,
}

/// Port implemented by every desk agent.
#[async_trait]
pub trait DomainAgent: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Runs one operation against the agent's store.
    async fn query(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError>;
}

/// The agents available to the engine, keyed by role.
///
/// A plan step whose role has no registered agent settles as an error for
/// that step; the rest of the plan continues.
#[derive(Clone, Default)]
pub struct AgentDirectory {
    agents: BTreeMap<AgentRole, Arc<dyn DomainAgent>>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent under its own role.
    pub fn with_agent(mut self, agent: Arc<dyn DomainAgent>) -> Self {
        self.agents.insert(agent.role(), agent);
        self
    }

    pub fn get(&self, role: AgentRole) -> Option<Arc<dyn DomainAgent>> {
        self.agents.get(&role).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn roles(&self) -> Vec<AgentRole> {
        self.agents.keys().copied().collect()
    }
}
