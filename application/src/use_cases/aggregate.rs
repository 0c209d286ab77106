//! Aggregate answer use case
//!
//! Builds the final answer from a settled execution context. The
//! structured facts always come from the deterministic domain composer;
//! the model is only invited to phrase them, and the template wording
//! steps in whenever it cannot.

use crate::config::ExecutionParams;
use crate::ports::language_model::LanguageModel;
use crossdesk_domain::{
    ExecutionContext, FailureReason, FinalAnswer, StructuredFacts, compose_facts, render_template,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Use case for composing the customer-facing answer.
pub struct AggregateAnswerUseCase<M: LanguageModel + 'static> {
    model: Arc<M>,
    params: ExecutionParams,
}

impl<M: LanguageModel + 'static> AggregateAnswerUseCase<M> {
    pub fn new(model: Arc<M>, params: ExecutionParams) -> Self {
        Self { model, params }
    }

    /// Composes the answer for a run that settled normally.
    pub async fn compose(&self, ctx: &ExecutionContext) -> FinalAnswer {
        let facts = compose_facts(ctx);
        let trace = ctx.trace.clone();
        match self.phrase(&facts).await {
            Some(text) => FinalAnswer::new(text, facts, trace).phrased(),
            None => {
                debug!("phrasing unavailable, using template wording");
                FinalAnswer::new(render_template(&facts), facts, trace)
            }
        }
    }

    /// Composes the answer for a run that ended in a terminal failure.
    ///
    /// No model call here; the failure wording is fixed and whatever was
    /// gathered rides along via the template.
    pub fn compose_failed(&self, reason: FailureReason, ctx: &ExecutionContext) -> FinalAnswer {
        FinalAnswer::failed(reason, compose_facts(ctx), ctx.trace.clone())
    }

    async fn phrase(&self, facts: &StructuredFacts) -> Option<String> {
        for attempt in 0..=self.params.phrase_retries {
            match tokio::time::timeout(self.params.model_timeout, self.model.phrase_answer(facts))
                .await
            {
                Ok(Ok(text)) if !text.trim().is_empty() => return Some(text),
                Ok(Ok(_)) => warn!("model returned empty phrasing"),
                Ok(Err(err)) => {
                    warn!("phrasing attempt {} failed: {}", attempt + 1, err);
                    if !err.is_transient() {
                        break;
                    }
                }
                Err(_) => warn!("phrasing attempt {} timed out", attempt + 1),
            }
        }
        None
    }
}
