//! Core domain concepts shared across all subdomains.
//!
//! - [`error::EngineError`]: terminal planning and orchestration errors

pub mod error;
