//! Query orchestration domain
//!
//! The planning and lifecycle core: dependency resolution into an ordered
//! plan, the shared execution context, per-step readiness checks, and the
//! pure state machine the driver steps through.

pub mod context;
pub mod machine;
pub mod readiness;
pub mod resolver;

pub use context::{ExecutionContext, StepStatus, StepTrace};
pub use machine::{
    Effect, EngineEvent, EngineState, FailureReason, Transition, transition,
};
pub use readiness::{MissingFieldRequest, Readiness, check_ready, consolidate};
pub use resolver::{ExecutionPlan, PlanStep, resolve};
