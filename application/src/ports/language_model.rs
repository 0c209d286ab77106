//! Language model port.
//!
//! The engine uses a model for exactly two jobs: turning raw text into a
//! [`QueryIntent`] and phrasing [`StructuredFacts`] as prose. The model
//! never touches stores, never invents facts, and never sees more than
//! the structured summary when phrasing.

use async_trait::async_trait;
use crossdesk_domain::{QueryIntent, StructuredFacts};
use thiserror::Error;

/// Errors from the model backend.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request timed out")]
    Timeout,

    #[error("Model request failed: {0}")]
    RequestFailed(String),

    #[error("Model returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("All configured models failed after {attempts} attempts")]
    Exhausted { attempts: usize },
}

impl ModelError {
    /// True when the same request might succeed on a retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Timeout | ModelError::RequestFailed(_))
    }
}

/// Port for the two model-backed steps of a query.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// A short label for logs ("openrouter", "heuristic").
    fn name(&self) -> &str;

    /// Turns the customer's raw text into a structured intent.
    async fn extract_intent(&self, raw_text: &str) -> Result<QueryIntent, ModelError>;

    /// Phrases the structured facts as a customer-facing answer. The
    /// returned text must not add information beyond the facts.
    async fn phrase_answer(&self, facts: &StructuredFacts) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelError::Timeout.is_transient());
        assert!(ModelError::RequestFailed("503".to_string()).is_transient());
        assert!(!ModelError::InvalidResponse("not json".to_string()).is_transient());
        assert!(!ModelError::Exhausted { attempts: 5 }.is_transient());
    }
}
