//! Shared execution context threaded through a plan run.

use crate::agent::{AgentResult, AgentRole, EntityField, Operation, ResultStatus};
use crate::query::QueryIntent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a plan step settled, as recorded in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    NotFound,
    Errored,
    Skipped,
}

impl From<ResultStatus> for StepStatus {
    fn from(status: ResultStatus) -> Self {
        match status {
            ResultStatus::Found => StepStatus::Completed,
            ResultStatus::NotFound => StepStatus::NotFound,
            ResultStatus::Error => StepStatus::Errored,
        }
    }
}

impl StepStatus {
    /// True when the step produced usable output for the final answer.
    pub fn is_usable(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::NotFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Completed => "completed",
            StepStatus::NotFound => "not_found",
            StepStatus::Errored => "errored",
            StepStatus::Skipped => "skipped",
        }
    }
}

/// One line of the execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
    pub role: AgentRole,
    pub operation: Operation,
    pub status: StepStatus,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StepTrace {
    pub fn new(role: AgentRole, operation: Operation, status: StepStatus, elapsed_ms: u64) -> Self {
        Self {
            role,
            operation,
            status,
            elapsed_ms,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Everything gathered while a plan runs: known entity values, per-agent
/// results, and the step trace.
///
/// Entities are append-only and first-write-wins. A value lifted from the
/// query text stays authoritative; later steps can add fields but never
/// overwrite one, which keeps concurrent waves order-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub entities: BTreeMap<EntityField, String>,
    pub results: Vec<AgentResult>,
    pub trace: Vec<StepTrace>,
    /// Captured once from the intent; steers follow-up prompts toward the
    /// email address for account-wide questions.
    pub account_level: bool,
}

impl ExecutionContext {
    pub fn for_intent(intent: &QueryIntent) -> Self {
        Self {
            entities: intent.entities.clone(),
            results: Vec::new(),
            trace: Vec::new(),
            account_level: intent.is_account_level(),
        }
    }

    pub fn has(&self, field: EntityField) -> bool {
        self.entities.contains_key(&field)
    }

    pub fn get(&self, field: EntityField) -> Option<&str> {
        self.entities.get(&field).map(String::as_str)
    }

    /// Records an entity value unless one is already known. Returns
    /// whether the value was written.
    pub fn record_entity(&mut self, field: EntityField, value: impl Into<String>) -> bool {
        if self.entities.contains_key(&field) {
            return false;
        }
        self.entities.insert(field, value.into());
        true
    }

    /// Stores an agent result and publishes its fields.
    pub fn absorb(&mut self, result: AgentResult) {
        for (field, value) in &result.fields {
            self.record_entity(*field, value.clone());
        }
        self.results.push(result);
    }

    pub fn record_trace(&mut self, trace: StepTrace) {
        self.trace.push(trace);
    }

    pub fn result_for(&self, role: AgentRole) -> Option<&AgentResult> {
        self.results.iter().find(|r| r.role == role)
    }

    /// The recorded settlement for a role, if it has settled.
    pub fn step_status(&self, role: AgentRole) -> Option<StepStatus> {
        self.trace
            .iter()
            .rev()
            .find(|t| t.role == role)
            .map(|t| t.status)
    }

    /// Prefer asking for an email over a record ID in follow-ups.
    pub fn prefer_email(&self) -> bool {
        self.account_level
    }

    /// True when no settled step produced usable output and at least one
    /// errored.
    pub fn all_steps_failed(&self) -> bool {
        !self.trace.is_empty()
            && self.trace.iter().all(|t| !t.status.is_usable())
            && self.trace.iter().any(|t| t.status == StepStatus::Errored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_intent() -> QueryIntent {
        QueryIntent::new("where is order 1")
            .with_agent(AgentRole::Order)
            .with_agent(AgentRole::Shipping)
            .with_entity(EntityField::OrderId, "1")
    }

    #[test]
    fn test_seeds_entities_from_intent() {
        let ctx = ExecutionContext::for_intent(&base_intent());
        assert_eq!(ctx.get(EntityField::OrderId), Some("1"));
        assert!(!ctx.account_level);
    }

    #[test]
    fn test_first_write_wins() {
        let mut ctx = ExecutionContext::for_intent(&base_intent());
        assert!(!ctx.record_entity(EntityField::OrderId, "99"));
        assert_eq!(ctx.get(EntityField::OrderId), Some("1"));
        assert!(ctx.record_entity(EntityField::UserId, "1"));
        assert!(!ctx.record_entity(EntityField::UserId, "2"));
        assert_eq!(ctx.get(EntityField::UserId), Some("1"));
    }

    #[test]
    fn test_absorb_publishes_fields() {
        let mut ctx = ExecutionContext::for_intent(&base_intent());
        let result = AgentResult::found(AgentRole::Order, Operation::OrderLookup)
            .with_field(EntityField::UserId, "1");
        ctx.absorb(result);
        assert_eq!(ctx.get(EntityField::UserId), Some("1"));
        assert!(ctx.result_for(AgentRole::Order).is_some());
        assert!(ctx.result_for(AgentRole::Payment).is_none());
    }

    #[test]
    fn test_step_status_reads_trace() {
        let mut ctx = ExecutionContext::for_intent(&base_intent());
        ctx.record_trace(StepTrace::new(
            AgentRole::Order,
            Operation::OrderLookup,
            StepStatus::Completed,
            12,
        ));
        assert_eq!(ctx.step_status(AgentRole::Order), Some(StepStatus::Completed));
        assert_eq!(ctx.step_status(AgentRole::Shipping), None);
    }

    #[test]
    fn test_all_steps_failed() {
        let mut ctx = ExecutionContext::for_intent(&base_intent());
        assert!(!ctx.all_steps_failed());

        ctx.record_trace(StepTrace::new(
            AgentRole::Order,
            Operation::OrderLookup,
            StepStatus::Errored,
            5,
        ));
        ctx.record_trace(StepTrace::new(
            AgentRole::Shipping,
            Operation::ShipmentLookup,
            StepStatus::Skipped,
            0,
        ));
        assert!(ctx.all_steps_failed());

        ctx.record_trace(StepTrace::new(
            AgentRole::Support,
            Operation::TicketLookup,
            StepStatus::NotFound,
            3,
        ));
        assert!(!ctx.all_steps_failed());
    }
}
