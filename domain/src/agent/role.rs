//! Desk agent roles and the declared dependency table.
//!
//! Each role owns one backing store and nothing else: orders, shipments,
//! payments, or support tickets. The table below is the single source of
//! truth for what a role consumes, what it publishes, and which peers feed
//! it context. The plan resolver derives its dependency graph from here
//! instead of hard-coding an execution order.

use crate::agent::field::EntityField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four desk agents, in priority order.
///
/// Priority breaks ties when several agents are equally ready to run:
/// order data usually unlocks the most downstream work, so it goes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Order,
    Shipping,
    Payment,
    Support,
}

impl AgentRole {
    /// All roles, highest priority first.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Order,
        AgentRole::Shipping,
        AgentRole::Payment,
        AgentRole::Support,
    ];

    /// Tie-break rank; lower runs first among equally-ready steps.
    pub fn priority(&self) -> usize {
        match self {
            AgentRole::Order => 0,
            AgentRole::Shipping => 1,
            AgentRole::Payment => 2,
            AgentRole::Support => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Order => "order",
            AgentRole::Shipping => "shipping",
            AgentRole::Payment => "payment",
            AgentRole::Support => "support",
        }
    }

    /// The customer-facing service each desk fronts.
    pub fn service_name(&self) -> &'static str {
        match self {
            AgentRole::Order => "ShopCore",
            AgentRole::Shipping => "ShipStream",
            AgentRole::Payment => "PayGuard",
            AgentRole::Support => "CareDesk",
        }
    }

    /// The declared capability row for this role.
    pub fn spec(&self) -> &'static RoleSpec {
        &ROLE_TABLE[self.priority()]
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "order" | "orders" | "catalog" => Ok(AgentRole::Order),
            "shipping" | "shipment" | "delivery" => Ok(AgentRole::Shipping),
            "payment" | "payments" | "billing" => Ok(AgentRole::Payment),
            "support" | "ticket" | "tickets" => Ok(AgentRole::Support),
            _ => Err(format!("Unknown agent role: {}", s)),
        }
    }
}

/// Declared capabilities of one role.
///
/// `requires` is a conjunction of alternative groups: every group must be
/// satisfiable, and a group is satisfied by any one of its fields being
/// known. Most roles carry a single group; see
/// [`crate::agent::Operation::required_groups`] for operation-specific
/// overrides.
#[derive(Debug, Clone, Copy)]
pub struct RoleSpec {
    pub role: AgentRole,
    pub requires: &'static [&'static [EntityField]],
    pub provides: &'static [EntityField],
    /// Peers whose findings enrich this role's answer. These only order the
    /// plan; they never gate execution.
    pub context_sources: &'static [AgentRole],
}

pub const ROLE_TABLE: [RoleSpec; 4] = [
    RoleSpec {
        role: AgentRole::Order,
        requires: &[&[EntityField::OrderId, EntityField::Email, EntityField::UserId]],
        provides: &[EntityField::UserId, EntityField::OrderId],
        context_sources: &[],
    },
    RoleSpec {
        role: AgentRole::Shipping,
        requires: &[&[EntityField::OrderId]],
        provides: &[EntityField::TrackingNumber],
        context_sources: &[],
    },
    RoleSpec {
        role: AgentRole::Payment,
        requires: &[&[EntityField::UserId]],
        provides: &[],
        context_sources: &[],
    },
    RoleSpec {
        role: AgentRole::Support,
        requires: &[&[EntityField::TicketId, EntityField::UserId]],
        provides: &[EntityField::TicketId],
        context_sources: &[AgentRole::Shipping, AgentRole::Payment],
    },
];

/// How one role depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The consumer needs a field only the producer can publish. Blocks the
    /// consumer until the producer settles.
    Data(EntityField),
    /// The consumer reads the producer's findings when present. Orders the
    /// plan but never blocks.
    Context,
}

/// A directed dependency between two roles in the same plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub producer: AgentRole,
    pub consumer: AgentRole,
    pub kind: EdgeKind,
}

/// Every dependency implied by the role table.
///
/// A data edge exists where a producer's `provides` overlaps a consumer's
/// `requires`; context edges come straight from `context_sources`.
pub fn declared_edges() -> Vec<DependencyEdge> {
    let mut edges = Vec::new();
    for producer in &ROLE_TABLE {
        for consumer in &ROLE_TABLE {
            if producer.role == consumer.role {
                continue;
            }
            for field in producer.provides {
                let wanted = consumer.requires.iter().any(|group| group.contains(field));
                if wanted {
                    edges.push(DependencyEdge {
                        producer: producer.role,
                        consumer: consumer.role,
                        kind: EdgeKind::Data(*field),
                    });
                }
            }
        }
    }
    for consumer in &ROLE_TABLE {
        for producer in consumer.context_sources {
            edges.push(DependencyEdge {
                producer: *producer,
                consumer: consumer.role,
                kind: EdgeKind::Context,
            });
        }
    }
    edges
}
