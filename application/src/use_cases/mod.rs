//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod aggregate;
pub mod run_query;
pub(crate) mod shared;

pub use aggregate::AggregateAnswerUseCase;
pub use run_query::{QueryOutcome, RunError, RunQueryUseCase};
