//! Execution parameters for the query driver.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! query driver in [`RunQueryUseCase`](crate::use_cases::run_query::RunQueryUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Query driver control parameters.
///
/// Controls model and agent timeouts plus retry counts. The follow-up
/// budget (one question per blocked step) is domain policy and lives in
/// the state machine, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for one model request.
    pub model_timeout: Duration,
    /// Extra attempts for intent extraction after a transient failure.
    pub extract_retries: usize,
    /// Extra attempts for answer phrasing before the template takes over.
    pub phrase_retries: usize,
    /// Timeout for one agent lookup.
    pub agent_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(30),
            extract_retries: 1,
            phrase_retries: 2,
            agent_timeout: Duration::from_secs(5),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_extract_retries(mut self, retries: usize) -> Self {
        self.extract_retries = retries;
        self
    }

    pub fn with_phrase_retries(mut self, retries: usize) -> Self {
        self.phrase_retries = retries;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }
}
