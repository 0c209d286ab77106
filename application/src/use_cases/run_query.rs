//! Run query use case
//!
//! Drives one customer query end to end: intent extraction, plan
//! resolution, agent execution with follow-up suspension, and answer
//! aggregation. The lifecycle itself lives in the domain state machine;
//! this driver dispatches agents, feeds events back in plan order, and
//! persists snapshots when a run suspends.

use crate::config::ExecutionParams;
use crate::ports::domain_agent::{AgentDirectory, AgentError};
use crate::ports::language_model::{LanguageModel, ModelError};
use crate::ports::progress::{NoProgress, QueryProgress};
use crate::ports::trace_logger::{NoTraceLogger, TraceEvent, TraceLogger};
use crate::use_cases::aggregate::AggregateAnswerUseCase;
use crate::use_cases::shared::check_cancelled;
use crossdesk_domain::{
    AgentResult, AgentRole, EngineError, EngineEvent, EngineState, EntityField, ExecutionContext,
    ExecutionPlan, FailureReason, FinalAnswer, MissingFieldRequest, QueryIntent, Readiness,
    SessionId, SessionRepository, SessionSnapshot, StepStatus, StepTrace, StructuredFacts,
    check_ready, consolidate, resolve, transition,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while driving a query.
///
/// Terminal outcomes the customer should see (nothing matched, a field
/// never arrived, every desk failed) are not errors here; they come back
/// as a [`FinalAnswer`] carrying the failure. This enum covers the
/// mechanical problems around the run itself.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Session store error: {0}")]
    Session(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Operation cancelled")]
    Cancelled,
}

/// What a run or resume call produced.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The query settled, successfully or not.
    Answer(FinalAnswer),
    /// The run suspended on a follow-up question. Resume with the session
    /// ID and the requested field.
    NeedsInput {
        session: SessionId,
        request: MissingFieldRequest,
    },
}

/// Use case for answering one customer query across the desk agents.
pub struct RunQueryUseCase<M, S>
where
    M: LanguageModel + 'static,
    S: SessionRepository + 'static,
{
    model: Arc<M>,
    agents: AgentDirectory,
    sessions: Arc<S>,
    logger: Arc<dyn TraceLogger>,
    progress: Arc<dyn QueryProgress>,
    params: ExecutionParams,
    cancel: Option<CancellationToken>,
}

impl<M, S> RunQueryUseCase<M, S>
where
    M: LanguageModel + 'static,
    S: SessionRepository + 'static,
{
    pub fn new(model: Arc<M>, agents: AgentDirectory, sessions: Arc<S>) -> Self {
        Self {
            model,
            agents,
            sessions,
            logger: Arc::new(NoTraceLogger),
            progress: Arc::new(NoProgress),
            params: ExecutionParams::default(),
            cancel: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_logger(mut self, logger: Arc<dyn TraceLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn QueryProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // ==================== Entry Points ====================

    /// Runs a fresh query from raw text.
    pub async fn run(&self, raw_text: &str) -> Result<QueryOutcome, RunError> {
        let started = Instant::now();
        check_cancelled(&self.cancel)?;

        self.logger
            .log(TraceEvent::new("query_received", json!({ "query": raw_text })));
        let mut state = EngineState::Parsing;
        self.progress.on_state(&state);

        let intent = match self.extract(raw_text).await {
            Ok(intent) => intent,
            Err(err) => {
                warn!("intent extraction failed: {}", err);
                let t = transition(&state, EngineEvent::ParseFailed)?;
                state = t.next;
                self.progress.on_state(&state);
                return self
                    .fail(None, FailureReason::ModelUnavailable, None, started)
                    .await;
            }
        };
        let t = transition(&state, EngineEvent::IntentParsed)?;
        state = t.next;
        self.progress.on_state(&state);
        self.progress.on_intent(&intent);
        self.logger.log(TraceEvent::new(
            "intent_extracted",
            json!({
                "extractor": self.model.name(),
                "agents": intent.required_agents.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
                "entities": &intent.entities,
            }),
        ));

        let plan = match resolve(&intent) {
            Ok(plan) => plan,
            Err(err) => {
                let reason = match &err {
                    EngineError::NoApplicableAgent => FailureReason::NoApplicableAgent,
                    EngineError::CyclicDependency { .. } => FailureReason::CyclicDependency,
                    _ => return Err(err.into()),
                };
                warn!("plan resolution failed: {}", err);
                let t = transition(&state, EngineEvent::ResolveFailed(reason.clone()))?;
                state = t.next;
                self.progress.on_state(&state);
                return self.fail(None, reason, None, started).await;
            }
        };
        let t = transition(&state, EngineEvent::PlanResolved { total: plan.len() })?;
        state = t.next;
        self.progress.on_state(&state);
        self.progress.on_plan(&plan);
        self.logger.log(TraceEvent::new(
            "plan_resolved",
            json!({
                "steps": plan.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            }),
        ));
        info!("plan resolved with {} steps", plan.len());

        let ctx = ExecutionContext::for_intent(&intent);
        self.drive(None, intent, ctx, plan, Vec::new(), state, started)
            .await
    }

    /// Resumes a suspended session with the answer to its follow-up.
    ///
    /// The supplied field is recorded first-write-wins, so an answer for a
    /// field the engine already knows changes nothing.
    pub async fn resume(
        &self,
        id: &SessionId,
        field: EntityField,
        value: impl Into<String>,
    ) -> Result<QueryOutcome, RunError> {
        let started = Instant::now();
        check_cancelled(&self.cancel)?;

        let snapshot = self
            .sessions
            .load(id)
            .await
            .map_err(|e| RunError::Session(e.to_string()))?
            .ok_or_else(|| RunError::UnknownSession(id.to_string()))?;
        let SessionSnapshot {
            id,
            intent,
            mut context,
            remaining,
            state,
            retried,
            ..
        } = snapshot;
        if !matches!(state, EngineState::AwaitingInput { .. }) {
            return Err(RunError::Session(format!(
                "session {} is not awaiting input",
                id
            )));
        }

        let value = value.into();
        self.logger.log(TraceEvent::new(
            "input_received",
            json!({ "session": id.as_str(), "field": field, "value": &value }),
        ));
        info!("resuming session {} with {}", id, field);
        context.record_entity(field, value);

        let t = transition(&state, EngineEvent::FieldSupplied { field })?;
        let state = t.next;
        self.progress.on_state(&state);

        self.drive(Some(id), intent, context, remaining, retried, state, started)
            .await
    }

    /// The follow-up request a suspended session is waiting on.
    ///
    /// Lets a caller that only holds the session ID attribute a bare
    /// reply to the right field before resuming.
    pub async fn pending_request(&self, id: &SessionId) -> Result<MissingFieldRequest, RunError> {
        let snapshot = self
            .sessions
            .load(id)
            .await
            .map_err(|e| RunError::Session(e.to_string()))?
            .ok_or_else(|| RunError::UnknownSession(id.to_string()))?;
        match snapshot.state {
            EngineState::AwaitingInput { request, .. } => Ok(request),
            _ => Err(RunError::Session(format!(
                "session {} is not awaiting input",
                id
            ))),
        }
    }

    // ==================== Driver ====================

    /// Drives the plan from the current executing state to an outcome.
    ///
    /// Independent ready steps are dispatched as one concurrent wave, but
    /// results are settled and fed to the state machine strictly in plan
    /// order, which keeps the context writes and the trace deterministic.
    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        mut session: Option<SessionId>,
        intent: QueryIntent,
        mut ctx: ExecutionContext,
        mut plan: ExecutionPlan,
        mut retried: Vec<AgentRole>,
        mut state: EngineState,
        started: Instant,
    ) -> Result<QueryOutcome, RunError> {
        while let EngineState::Executing { step, .. } = state {
            check_cancelled(&self.cancel)?;
            let plan_step = plan.steps[step].clone();

            // A producer that settled without data takes this step down
            // with it; the customer still sees why in the answer.
            if let Some(prereq) = plan_step
                .requires_data_from
                .iter()
                .copied()
                .find(|r| ctx.step_status(*r) != Some(StepStatus::Completed))
            {
                debug!("skipping {}: {} settled without data", plan_step.role, prereq);
                let trace = StepTrace::new(
                    plan_step.role,
                    plan_step.operation,
                    StepStatus::Skipped,
                    0,
                )
                .with_note(format!("{} lookup did not complete", prereq));
                ctx.record_trace(trace.clone());
                self.progress.on_step_settled(&trace);
                self.log_step(&trace, 0);
                let t = transition(&state, EngineEvent::StepSkipped { step })?;
                state = t.next;
                self.progress.on_state(&state);
                continue;
            }

            if let Readiness::NeedsField(request) = check_ready(&plan_step, &ctx) {
                // Only reorder when a later step could actually run first;
                // two blocked heads would otherwise swap places forever.
                let runnable_later = plan.steps[step + 1..].iter().any(|s| {
                    s.requires_data_from
                        .iter()
                        .all(|r| ctx.step_status(*r) == Some(StepStatus::Completed))
                        && check_ready(s, &ctx) == Readiness::Ready
                });
                if runnable_later && plan.defer(step) {
                    debug!(
                        "deferring {} while {} is missing",
                        plan_step.role, request.field
                    );
                    let t = transition(&state, EngineEvent::StepDeferred { step })?;
                    state = t.next;
                    continue;
                }

                let already_retried = retried.contains(&plan_step.role);
                let requests = blocked_head_requests(&plan, step, &ctx);
                let request = consolidate(&requests).unwrap_or(request);
                let t = transition(
                    &state,
                    EngineEvent::StepBlocked {
                        request: request.clone(),
                        already_retried,
                    },
                )?;
                state = t.next;
                self.progress.on_state(&state);

                if already_retried {
                    warn!("{} still blocked after its follow-up", plan_step.role);
                    return self
                        .fail(
                            session,
                            FailureReason::InsufficientInformation {
                                field: request.field,
                            },
                            Some(&ctx),
                            started,
                        )
                        .await;
                }
                return self
                    .suspend(session.take(), &intent, &ctx, &plan, step, retried, request)
                    .await;
            }

            // Extend the wave with every consecutive step that is ready
            // and fully unlocked. Ordering edges count here too: a step
            // ordered after one still inside the wave stays out and gets
            // its own wave once that step settles, so context readers see
            // their sources.
            let mut wave = vec![plan_step];
            while step + wave.len() < plan.len() {
                let candidate = &plan.steps[step + wave.len()];
                let unlocked = candidate
                    .ordered_after
                    .iter()
                    .all(|r| ctx.step_status(*r).is_some())
                    && candidate
                        .requires_data_from
                        .iter()
                        .all(|r| ctx.step_status(*r) == Some(StepStatus::Completed));
                if !unlocked || check_ready(candidate, &ctx) != Readiness::Ready {
                    break;
                }
                wave.push(candidate.clone());
            }
            if wave.len() > 1 {
                debug!("dispatching wave of {} steps", wave.len());
            }

            let mut join_set = JoinSet::new();
            for (offset, wave_step) in wave.iter().enumerate() {
                self.progress.on_step_start(wave_step);
                info!("dispatching {} ({})", wave_step.role, wave_step.operation);
                let agent = self.agents.get(wave_step.role);
                let role = wave_step.role;
                let operation = wave_step.operation;
                let params = ctx.entities.clone();
                let timeout = self.params.agent_timeout;
                join_set.spawn(async move {
                    let dispatched = Instant::now();
                    let outcome = match agent {
                        Some(agent) => {
                            match tokio::time::timeout(timeout, agent.query(operation, &params))
                                .await
                            {
                                Ok(result) => result,
                                Err(_) => Err(AgentError::Timeout),
                            }
                        }
                        None => Err(AgentError::StoreUnavailable(format!(
                            "no {} agent registered",
                            role
                        ))),
                    };
                    (offset, outcome, dispatched.elapsed())
                });
            }

            let mut outcomes: BTreeMap<usize, (Result<AgentResult, AgentError>, Duration)> =
                BTreeMap::new();
            let mut pending = wave.len();
            while pending > 0 {
                let joined = if let Some(token) = &self.cancel {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            join_set.abort_all();
                            return Err(RunError::Cancelled);
                        }
                        joined = join_set.join_next() => joined,
                    }
                } else {
                    join_set.join_next().await
                };
                match joined {
                    Some(Ok((offset, outcome, elapsed))) => {
                        outcomes.insert(offset, (outcome, elapsed));
                        pending -= 1;
                    }
                    Some(Err(e)) => {
                        warn!("agent task join error: {}", e);
                        pending -= 1;
                    }
                    None => break,
                }
            }

            for (offset, wave_step) in wave.iter().enumerate() {
                let (outcome, elapsed) = outcomes.remove(&offset).unwrap_or_else(|| {
                    (
                        Err(AgentError::StoreUnavailable(
                            "agent task failed".to_string(),
                        )),
                        Duration::ZERO,
                    )
                });
                let result = match outcome {
                    Ok(result) => result,
                    Err(err) => {
                        AgentResult::error(wave_step.role, wave_step.operation, err.to_string())
                    }
                };
                let status = StepStatus::from(result.status);
                let mut trace = StepTrace::new(
                    wave_step.role,
                    wave_step.operation,
                    status,
                    elapsed.as_millis() as u64,
                );
                if status == StepStatus::Errored
                    && let Some(error) = &result.error
                {
                    warn!("{} errored: {}", wave_step.role, error);
                    trace = trace.with_note(error.clone());
                } else {
                    info!("{} settled as {}", wave_step.role, status.as_str());
                }
                self.log_step(&trace, result.records.len());
                ctx.absorb(result);
                ctx.record_trace(trace.clone());
                self.progress.on_step_settled(&trace);

                let t = transition(&state, EngineEvent::StepFinished { step: step + offset })?;
                state = t.next;
                self.progress.on_state(&state);
            }
        }

        if ctx.all_steps_failed() {
            let t = transition(&state, EngineEvent::AllStepsErrored)?;
            state = t.next;
            self.progress.on_state(&state);
            return self
                .fail(session, FailureReason::AllAgentsFailed, Some(&ctx), started)
                .await;
        }

        let answer = self.aggregator().compose(&ctx).await;
        let t = transition(&state, EngineEvent::AnswerComposed)?;
        state = t.next;
        self.progress.on_state(&state);
        self.logger.log(TraceEvent::new(
            "answer_composed",
            json!({
                "phrased_by_model": answer.phrased_by_model,
                "elapsed_ms": started.elapsed().as_millis() as u64,
            }),
        ));
        self.discard(&session).await;
        info!("query answered in {} ms", started.elapsed().as_millis());
        Ok(QueryOutcome::Answer(answer))
    }

    // ==================== Helpers ====================

    async fn extract(&self, raw_text: &str) -> Result<QueryIntent, ModelError> {
        let mut attempt = 0;
        loop {
            match tokio::time::timeout(self.params.model_timeout, self.model.extract_intent(raw_text))
                .await
            {
                Ok(Ok(intent)) => return Ok(intent),
                Ok(Err(err)) => {
                    if err.is_transient() && attempt < self.params.extract_retries {
                        warn!("intent extraction failed ({}), retrying", err);
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
                Err(_) => {
                    if attempt < self.params.extract_retries {
                        warn!("intent extraction timed out, retrying");
                        attempt += 1;
                        continue;
                    }
                    return Err(ModelError::Timeout);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn suspend(
        &self,
        session: Option<SessionId>,
        intent: &QueryIntent,
        ctx: &ExecutionContext,
        plan: &ExecutionPlan,
        step: usize,
        mut retried: Vec<AgentRole>,
        request: MissingFieldRequest,
    ) -> Result<QueryOutcome, RunError> {
        if !retried.contains(&request.role) {
            retried.push(request.role);
        }
        let id = session.unwrap_or_else(SessionId::generate);
        let remaining = plan.suffix_from(step);
        // The snapshot is rebased so the blocked step sits at index 0 of
        // the remaining plan; resuming drives that suffix as its own run.
        let suspended = EngineState::AwaitingInput {
            step: 0,
            total: remaining.len(),
            request: request.clone(),
        };
        let mut snapshot = SessionSnapshot::new(
            id.clone(),
            intent.clone(),
            ctx.clone(),
            remaining,
            suspended,
        );
        snapshot.retried = retried;
        self.sessions
            .save(&snapshot)
            .await
            .map_err(|e| RunError::Session(e.to_string()))?;

        info!("suspended session {} waiting for {}", id, request.field);
        self.logger.log(TraceEvent::new(
            "input_requested",
            json!({
                "session": id.as_str(),
                "field": request.field,
                "prompt": &request.prompt,
            }),
        ));
        self.progress.on_prompt(&request);
        Ok(QueryOutcome::NeedsInput {
            session: id,
            request,
        })
    }

    /// Finishes a run that ended in a terminal failure, returning the
    /// failure answer with whatever partials were gathered.
    async fn fail(
        &self,
        session: Option<SessionId>,
        reason: FailureReason,
        ctx: Option<&ExecutionContext>,
        started: Instant,
    ) -> Result<QueryOutcome, RunError> {
        let answer = match ctx {
            Some(ctx) => self.aggregator().compose_failed(reason.clone(), ctx),
            None => FinalAnswer::failed(reason.clone(), StructuredFacts::default(), Vec::new()),
        };
        self.logger.log(TraceEvent::new(
            "query_failed",
            json!({
                "reason": reason,
                "elapsed_ms": started.elapsed().as_millis() as u64,
            }),
        ));
        self.discard(&session).await;
        Ok(QueryOutcome::Answer(answer))
    }

    async fn discard(&self, session: &Option<SessionId>) {
        if let Some(id) = session
            && let Err(err) = self.sessions.delete(id).await
        {
            warn!("failed to discard session {}: {}", id, err);
        }
    }

    fn log_step(&self, trace: &StepTrace, row_count: usize) {
        self.logger.log(TraceEvent::new(
            "step_completed",
            json!({
                "role": trace.role.as_str(),
                "operation": trace.operation.as_str(),
                "status": trace.status.as_str(),
                "row_count": row_count,
                "execution_time_ms": trace.elapsed_ms,
            }),
        ));
    }

    fn aggregator(&self) -> AggregateAnswerUseCase<M> {
        AggregateAnswerUseCase::new(Arc::clone(&self.model), self.params.clone())
    }
}

/// Every remaining step whose in-plan producers have all settled and that
/// still cannot run. These are the asks only the customer can unblock, so
/// their prompts are folded into one question.
fn blocked_head_requests(
    plan: &ExecutionPlan,
    from: usize,
    ctx: &ExecutionContext,
) -> Vec<MissingFieldRequest> {
    let remaining = plan.steps.get(from..).unwrap_or_default();
    let remaining_roles: BTreeSet<AgentRole> = remaining.iter().map(|s| s.role).collect();
    remaining
        .iter()
        .filter(|s| {
            s.requires_data_from
                .iter()
                .all(|r| !remaining_roles.contains(r))
        })
        .filter_map(|s| match check_ready(s, ctx) {
            Readiness::NeedsField(request) => Some(request),
            Readiness::Ready => None,
        })
        .collect()
}
