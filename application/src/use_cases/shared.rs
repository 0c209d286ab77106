//! Shared utilities for use cases.

use crate::use_cases::run_query::RunError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_token_is_never_cancelled() {
        assert!(check_cancelled(&None).is_ok());
    }

    #[test]
    fn test_cancelled_token_is_reported() {
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(matches!(
            check_cancelled(&Some(token)),
            Err(RunError::Cancelled)
        ));
    }
}
