//! Structured intent extracted from a customer query.

use crate::agent::{AgentRole, EntityField, Operation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the customer asked, reduced to agents, operations, and entities.
///
/// This is the bridge between free text and the plan resolver. Extraction
/// (model-backed or heuristic) fills it in; everything downstream works
/// only from this structure and never re-reads the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    /// The original query, kept for logging and answer phrasing.
    pub raw_text: String,
    /// Entity values lifted straight from the query text.
    #[serde(default)]
    pub entities: BTreeMap<EntityField, String>,
    /// Roles the query needs, before dependency resolution.
    #[serde(default)]
    pub required_agents: Vec<AgentRole>,
    /// Operation per role where extraction was specific; anything absent
    /// falls back to the role default.
    #[serde(default)]
    pub operations: BTreeMap<AgentRole, Operation>,
}

impl QueryIntent {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            entities: BTreeMap::new(),
            required_agents: Vec::new(),
            operations: BTreeMap::new(),
        }
    }

    /// Adds an extracted entity value.
    pub fn with_entity(mut self, field: EntityField, value: impl Into<String>) -> Self {
        self.entities.insert(field, value.into());
        self
    }

    /// Marks a role as required. Duplicates are ignored.
    pub fn with_agent(mut self, role: AgentRole) -> Self {
        if !self.required_agents.contains(&role) {
            self.required_agents.push(role);
        }
        self
    }

    /// Pins a specific operation for a role.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        let role = operation.role();
        self.operations.insert(role, operation);
        if !self.required_agents.contains(&role) {
            self.required_agents.push(role);
        }
        self
    }

    /// The operation a role will run, falling back to its default lookup.
    pub fn operation_for(&self, role: AgentRole) -> Operation {
        self.operations
            .get(&role)
            .copied()
            .unwrap_or_else(|| Operation::default_for(role))
    }

    pub fn has_entity(&self, field: EntityField) -> bool {
        self.entities.contains_key(&field)
    }

    /// True when the query is about the account as a whole rather than one
    /// identified record. Account-level queries prefer asking for an email
    /// address over an order number when information is missing.
    pub fn is_account_level(&self) -> bool {
        let targets_account = self
            .required_agents
            .iter()
            .any(|r| matches!(r, AgentRole::Payment | AgentRole::Support));
        targets_account
            && !self.has_entity(EntityField::OrderId)
            && !self.has_entity(EntityField::TicketId)
    }

    pub fn is_empty(&self) -> bool {
        self.required_agents.is_empty()
    }
}
