//! Result of a single agent query.

use crate::agent::field::EntityField;
use crate::agent::operation::Operation;
use crate::agent::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an agent's lookup settled.
///
/// `NotFound` is a legitimate answer, not a failure: "no open tickets" is
/// information the final answer reports. Only `Error` marks the step as
/// unusable for dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Found,
    NotFound,
    Error,
}

/// Everything one agent reports back for one plan step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub role: AgentRole,
    pub operation: Operation,
    pub status: ResultStatus,
    /// Fields published for downstream steps (e.g. the `UserID` resolved
    /// from an email address).
    #[serde(default)]
    pub fields: BTreeMap<EntityField, String>,
    /// Matched store rows, as reported to the aggregator.
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
    /// Short annotation carried into the final answer ("no open tickets").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Failure description when `status` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    /// A successful lookup with matching records.
    pub fn found(role: AgentRole, operation: Operation) -> Self {
        Self {
            role,
            operation,
            status: ResultStatus::Found,
            fields: BTreeMap::new(),
            records: Vec::new(),
            note: None,
            error: None,
        }
    }

    /// A lookup that ran cleanly but matched nothing.
    pub fn not_found(role: AgentRole, operation: Operation, note: impl Into<String>) -> Self {
        Self {
            role,
            operation,
            status: ResultStatus::NotFound,
            fields: BTreeMap::new(),
            records: Vec::new(),
            note: Some(note.into()),
            error: None,
        }
    }

    /// A lookup that failed outright.
    pub fn error(role: AgentRole, operation: Operation, message: impl Into<String>) -> Self {
        Self {
            role,
            operation,
            status: ResultStatus::Error,
            fields: BTreeMap::new(),
            records: Vec::new(),
            note: None,
            error: Some(message.into()),
        }
    }

    /// Publishes a field for downstream steps.
    pub fn with_field(mut self, field: EntityField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Attaches the matched rows.
    pub fn with_records(mut self, records: Vec<serde_json::Value>) -> Self {
        self.records = records;
        self
    }

    /// Attaches a short annotation for the final answer.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_found(&self) -> bool {
        self.status == ResultStatus::Found
    }

    pub fn is_error(&self) -> bool {
        self.status == ResultStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_found_with_fields_and_records() {
        let result = AgentResult::found(AgentRole::Order, Operation::OrderLookup)
            .with_field(EntityField::UserId, "1")
            .with_field(EntityField::OrderId, "1")
            .with_records(vec![json!({"OrderID": 1, "Status": "Delivered"})]);

        assert!(result.is_found());
        assert_eq!(result.fields.get(&EntityField::UserId).unwrap(), "1");
        assert_eq!(result.records.len(), 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let result = AgentResult::not_found(
            AgentRole::Support,
            Operation::TicketLookup,
            "no open tickets",
        );
        assert_eq!(result.status, ResultStatus::NotFound);
        assert!(!result.is_error());
        assert_eq!(result.note.as_deref(), Some("no open tickets"));
    }

    #[test]
    fn test_error_carries_message() {
        let result = AgentResult::error(
            AgentRole::Payment,
            Operation::PaymentLookup,
            "store unavailable",
        );
        assert!(result.is_error());
        assert_eq!(result.error.as_deref(), Some("store unavailable"));
    }

    #[test]
    fn test_serde_round_trip() {
        let result = AgentResult::found(AgentRole::Shipping, Operation::ShipmentLookup)
            .with_field(EntityField::TrackingNumber, "TRK001");
        let json = serde_json::to_string(&result).unwrap();
        let back: AgentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
