//! Operations a desk agent can perform against its store.

use crate::agent::field::EntityField;
use crate::agent::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete lookup an agent runs for one plan step.
///
/// Intent extraction picks the operation per role; anything it leaves
/// unspecified falls back to [`Operation::default_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    OrderLookup,
    ShipmentLookup,
    PaymentLookup,
    RefundLookup,
    TicketLookup,
}

impl Operation {
    /// The role that executes this operation.
    pub fn role(&self) -> AgentRole {
        match self {
            Operation::OrderLookup => AgentRole::Order,
            Operation::ShipmentLookup => AgentRole::Shipping,
            Operation::PaymentLookup | Operation::RefundLookup => AgentRole::Payment,
            Operation::TicketLookup => AgentRole::Support,
        }
    }

    /// The operation used when intent extraction names a role but no
    /// specific operation.
    pub fn default_for(role: AgentRole) -> Operation {
        match role {
            AgentRole::Order => Operation::OrderLookup,
            AgentRole::Shipping => Operation::ShipmentLookup,
            AgentRole::Payment => Operation::PaymentLookup,
            AgentRole::Support => Operation::TicketLookup,
        }
    }

    /// Required fields as a conjunction of alternative groups.
    ///
    /// Every group must have at least one member known before the step can
    /// run. Most operations inherit their role's declared requirements;
    /// refund lookups additionally need the payment method to match refund
    /// rows against.
    pub fn required_groups(&self) -> &'static [&'static [EntityField]] {
        match self {
            Operation::RefundLookup => &[
                &[EntityField::UserId],
                &[EntityField::PaymentMethodId],
            ],
            _ => self.role().spec().requires,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::OrderLookup => "order_lookup",
            Operation::ShipmentLookup => "shipment_lookup",
            Operation::PaymentLookup => "payment_lookup",
            Operation::RefundLookup => "refund_lookup",
            Operation::TicketLookup => "ticket_lookup",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "order_lookup" | "orderlookup" => Ok(Operation::OrderLookup),
            "shipment_lookup" | "shipmentlookup" => Ok(Operation::ShipmentLookup),
            "payment_lookup" | "paymentlookup" => Ok(Operation::PaymentLookup),
            "refund_lookup" | "refundlookup" => Ok(Operation::RefundLookup),
            "ticket_lookup" | "ticketlookup" => Ok(Operation::TicketLookup),
            _ => Err(format!("Unknown operation: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_role() {
        for role in AgentRole::ALL {
            assert_eq!(Operation::default_for(role).role(), role);
        }
    }

    #[test]
    fn test_refund_requires_both_groups() {
        let groups = Operation::RefundLookup.required_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], &[EntityField::UserId]);
        assert_eq!(groups[1], &[EntityField::PaymentMethodId]);
    }

    #[test]
    fn test_lookup_inherits_role_requirements() {
        assert_eq!(
            Operation::ShipmentLookup.required_groups(),
            AgentRole::Shipping.spec().requires
        );
        assert_eq!(
            Operation::TicketLookup.required_groups(),
            AgentRole::Support.spec().requires
        );
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Operation::RefundLookup).unwrap();
        assert_eq!(json, "\"refund_lookup\"");
        let op: Operation = serde_json::from_str("\"ticket_lookup\"").unwrap();
        assert_eq!(op, Operation::TicketLookup);
    }
}
