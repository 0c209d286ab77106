//! Application layer for crossdesk
//!
//! This crate contains use cases, port definitions, and execution
//! parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    domain_agent::{AgentDirectory, AgentError, DomainAgent},
    language_model::{LanguageModel, ModelError},
    progress::{NoProgress, QueryProgress},
    trace_logger::{NoTraceLogger, TraceEvent, TraceLogger},
};
pub use use_cases::aggregate::AggregateAnswerUseCase;
pub use use_cases::run_query::{QueryOutcome, RunError, RunQueryUseCase};
