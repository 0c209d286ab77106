//! Domain layer for crossdesk
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Desk agents
//!
//! Four agents each own one backing store: orders, shipments, payments,
//! and support tickets. They exchange typed entity fields, never raw
//! rows; the [`agent::role::ROLE_TABLE`] declares what each consumes and
//! publishes.
//!
//! ## Orchestration
//!
//! A query becomes a [`query::QueryIntent`], which the resolver turns
//! into a topologically ordered [`orchestration::ExecutionPlan`]. The
//! engine lifecycle is a pure state machine in
//! [`orchestration::machine`]; suspended runs persist as
//! [`session::SessionSnapshot`]s until the customer answers a follow-up.

pub mod agent;
pub mod aggregation;
pub mod config;
pub mod core;
pub mod orchestration;
pub mod query;
pub mod session;

// Re-export commonly used types
pub use agent::{
    field::EntityField,
    operation::Operation,
    result::{AgentResult, ResultStatus},
    role::{AgentRole, DependencyEdge, EdgeKind, ROLE_TABLE, RoleSpec, declared_edges},
};
pub use aggregation::{
    FactSection, FinalAnswer, StructuredFacts, compose_facts, render_template,
};
pub use config::OutputFormat;
pub use core::error::EngineError;
pub use orchestration::{
    Effect, EngineEvent, EngineState, ExecutionContext, ExecutionPlan, FailureReason,
    MissingFieldRequest, PlanStep, Readiness, StepStatus, StepTrace, Transition, check_ready,
    consolidate, resolve, transition,
};
pub use query::QueryIntent;
pub use session::{SessionId, SessionRepository, SessionSnapshot};
