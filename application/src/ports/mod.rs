//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod domain_agent;
pub mod language_model;
pub mod progress;
pub mod trace_logger;

pub use domain_agent::{AgentDirectory, AgentError, DomainAgent};
pub use language_model::{LanguageModel, ModelError};
pub use progress::{NoProgress, QueryProgress};
pub use trace_logger::{NoTraceLogger, TraceEvent, TraceLogger};
