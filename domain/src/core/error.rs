//! Engine error types

use thiserror::Error;

/// Errors raised while planning or driving a query across the desk agents.
///
/// These cover terminal planning failures and driver bugs; a single agent
/// returning no rows is not an error and is reported through
/// [`crate::agent::ResultStatus`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No agent covers this request")]
    NoApplicableAgent,

    #[error("Agent dependencies form a cycle: {roles}")]
    CyclicDependency { roles: String },

    #[error("Required field still missing after follow-up: {field}")]
    InsufficientInformation { field: String },

    #[error("Every agent in the plan failed")]
    AllAgentsFailed,

    #[error("Query cancelled")]
    Cancelled,

    #[error("No transition from {state} on {event}")]
    InvalidTransition { state: String, event: String },
}

impl EngineError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EngineError::NoApplicableAgent.to_string(),
            "No agent covers this request"
        );
        let err = EngineError::InsufficientInformation {
            field: "OrderID".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Required field still missing after follow-up: OrderID"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(EngineError::Cancelled.is_cancelled());
        assert!(!EngineError::NoApplicableAgent.is_cancelled());
        assert!(!EngineError::AllAgentsFailed.is_cancelled());
    }
}
