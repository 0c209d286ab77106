//! Progress notification port
//!
//! Defines the interface for reporting progress during query execution.
//! All callback argument types come from the domain layer, and every
//! method has a default no-op implementation, so implementers only
//! override the callbacks they care about.

use crossdesk_domain::{
    EngineState, ExecutionPlan, MissingFieldRequest, PlanStep, QueryIntent, StepTrace,
};

/// Callback for progress updates during query execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait QueryProgress: Send + Sync {
    /// Called on every engine state change
    fn on_state(&self, _state: &EngineState) {}

    /// Called once intent extraction settles
    fn on_intent(&self, _intent: &QueryIntent) {}

    /// Called once the plan is resolved
    fn on_plan(&self, _plan: &ExecutionPlan) {}

    /// Called when a step is dispatched to its agent
    fn on_step_start(&self, _step: &PlanStep) {}

    /// Called when a step settles, skips included
    fn on_step_settled(&self, _trace: &StepTrace) {}

    /// Called when the engine suspends on a follow-up question
    fn on_prompt(&self, _request: &MissingFieldRequest) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl QueryProgress for NoProgress {}
