//! Desk agent implementations, one per store.

mod order;
mod payment;
mod shipping;
mod support;

pub use order::OrderAgent;
pub use payment::PaymentAgent;
pub use shipping::ShippingAgent;
pub use support::SupportAgent;

use crossdesk_application::ports::domain_agent::{AgentDirectory, AgentError};
use crossdesk_domain::EntityField;
use serde::Serialize;
use std::sync::Arc;

/// The full desk roster with seeded stores.
pub fn seeded_directory() -> AgentDirectory {
    AgentDirectory::new()
        .with_agent(Arc::new(OrderAgent::new()))
        .with_agent(Arc::new(ShippingAgent::new()))
        .with_agent(Arc::new(PaymentAgent::new()))
        .with_agent(Arc::new(SupportAgent::new()))
}

/// Parses a numeric identifier parameter.
pub(crate) fn parse_id(field: EntityField, raw: &str) -> Result<u32, AgentError> {
    raw.trim().parse().map_err(|_| {
        AgentError::MalformedParams(format!("{} must be numeric, got '{}'", field, raw))
    })
}

/// Serializes a store row into an answer record.
pub(crate) fn record<T: Serialize>(row: &T) -> serde_json::Value {
    serde_json::to_value(row).unwrap_or(serde_json::Value::Null)
}
