//! The engine lifecycle as a pure state machine.
//!
//! `transition` computes the next state and the effects to run from the
//! current state and one event. It touches no clocks, stores, or agents,
//! so every path through the lifecycle can be exercised in plain unit
//! tests. The driver owns dispatching effects and feeding back events, in
//! plan order even when the underlying agent runs overlapped.

use crate::agent::EntityField;
use crate::core::error::EngineError;
use crate::orchestration::readiness::MissingFieldRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run ended without a normal answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoApplicableAgent,
    CyclicDependency,
    InsufficientInformation { field: EntityField },
    AllAgentsFailed,
    ModelUnavailable,
    Cancelled,
}

impl FailureReason {
    /// The sentence shown to the customer when the run ends this way.
    pub fn user_message(&self) -> String {
        match self {
            FailureReason::NoApplicableAgent => {
                "I could not match this request to any of our service desks. \
                 Could you rephrase what you need help with?"
                    .to_string()
            }
            FailureReason::CyclicDependency => {
                "Something went wrong while planning this request. Please try again.".to_string()
            }
            FailureReason::InsufficientInformation { field } => format!(
                "I still do not have the {} I need, so I could not finish this request.",
                field.describe()
            ),
            FailureReason::AllAgentsFailed => {
                "None of our service desks could be reached. Please try again in a moment."
                    .to_string()
            }
            FailureReason::ModelUnavailable => {
                "I could not understand the request right now. Please try again in a moment."
                    .to_string()
            }
            FailureReason::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

/// Where the engine is in one query's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    /// Turning raw text into a structured intent.
    Parsing,
    /// Resolving the intent into an ordered plan.
    Resolving,
    /// Driving the plan, currently at `step` of `total`.
    Executing { step: usize, total: usize },
    /// Suspended on a follow-up question; resumable from a snapshot.
    AwaitingInput {
        step: usize,
        total: usize,
        request: MissingFieldRequest,
    },
    /// All steps settled; composing the final answer.
    Aggregating,
    Done,
    Failed(FailureReason),
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Parsing => "parsing",
            EngineState::Resolving => "resolving",
            EngineState::Executing { .. } => "executing",
            EngineState::AwaitingInput { .. } => "awaiting_input",
            EngineState::Aggregating => "aggregating",
            EngineState::Done => "done",
            EngineState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Done | EngineState::Failed(_))
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Something that happened; the input half of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    IntentParsed,
    /// Extraction produced nothing usable, heuristics included.
    ParseFailed,
    PlanResolved { total: usize },
    ResolveFailed(FailureReason),
    /// The step at this index settled, whether found, empty, or errored.
    StepFinished { step: usize },
    /// The step at this index was skipped because a producer it needs
    /// settled without the data.
    StepSkipped { step: usize },
    /// The current step was reordered behind runnable work after blocking
    /// on a missing field.
    StepDeferred { step: usize },
    /// The current step is blocked and nothing else can run first.
    /// `already_retried` is true when this step's role has used up its one
    /// follow-up.
    StepBlocked {
        request: MissingFieldRequest,
        already_retried: bool,
    },
    /// The customer answered the follow-up.
    FieldSupplied { field: EntityField },
    /// Every settled step errored or was skipped.
    AllStepsErrored,
    AnswerComposed,
    Cancelled,
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::IntentParsed => "intent_parsed",
            EngineEvent::ParseFailed => "parse_failed",
            EngineEvent::PlanResolved { .. } => "plan_resolved",
            EngineEvent::ResolveFailed(_) => "resolve_failed",
            EngineEvent::StepFinished { .. } => "step_finished",
            EngineEvent::StepSkipped { .. } => "step_skipped",
            EngineEvent::StepDeferred { .. } => "step_deferred",
            EngineEvent::StepBlocked { .. } => "step_blocked",
            EngineEvent::FieldSupplied { .. } => "field_supplied",
            EngineEvent::AllStepsErrored => "all_steps_errored",
            EngineEvent::AnswerComposed => "answer_composed",
            EngineEvent::Cancelled => "cancelled",
        }
    }
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ResolvePlan,
    RunStep(usize),
    PersistSnapshot,
    EmitPrompt(MissingFieldRequest),
    ComposeAnswer,
    DiscardSession,
}

/// The output half of a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: EngineState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: EngineState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Computes the next state and effects for one event.
///
/// Undefined pairs return [`EngineError::InvalidTransition`] instead of
/// being silently absorbed; the driver treats that as a bug, not user
/// error.
pub fn transition(state: &EngineState, event: EngineEvent) -> Result<Transition, EngineError> {
    let invalid = |state: &EngineState, event: &EngineEvent| {
        Err(EngineError::InvalidTransition {
            state: state.name().to_string(),
            event: event.name().to_string(),
        })
    };

    match (state, &event) {
        (_, EngineEvent::Cancelled) if !state.is_terminal() => {
            Ok(Transition::to(EngineState::Failed(FailureReason::Cancelled)))
        }

        (EngineState::Parsing, EngineEvent::IntentParsed) => {
            Ok(Transition::to(EngineState::Resolving).with(Effect::ResolvePlan))
        }
        (EngineState::Parsing, EngineEvent::ParseFailed) => Ok(Transition::to(
            EngineState::Failed(FailureReason::ModelUnavailable),
        )
        .with(Effect::ComposeAnswer)),

        (EngineState::Resolving, EngineEvent::PlanResolved { total }) => {
            if *total == 0 {
                return invalid(state, &event);
            }
            Ok(Transition::to(EngineState::Executing {
                step: 0,
                total: *total,
            })
            .with(Effect::RunStep(0)))
        }
        (EngineState::Resolving, EngineEvent::ResolveFailed(reason)) => {
            Ok(Transition::to(EngineState::Failed(reason.clone())).with(Effect::ComposeAnswer))
        }

        (
            EngineState::Executing { step, total },
            EngineEvent::StepFinished { step: settled } | EngineEvent::StepSkipped { step: settled },
        ) => {
            if settled != step {
                return invalid(state, &event);
            }
            if step + 1 == *total {
                Ok(Transition::to(EngineState::Aggregating).with(Effect::ComposeAnswer))
            } else {
                Ok(Transition::to(EngineState::Executing {
                    step: step + 1,
                    total: *total,
                })
                .with(Effect::RunStep(step + 1)))
            }
        }
        (EngineState::Executing { step, total }, EngineEvent::StepDeferred { step: deferred }) => {
            if deferred != step {
                return invalid(state, &event);
            }
            // The plan was reordered; the same index now holds a runnable
            // step.
            Ok(Transition::to(EngineState::Executing {
                step: *step,
                total: *total,
            })
            .with(Effect::RunStep(*step)))
        }
        (
            EngineState::Executing { step, total },
            EngineEvent::StepBlocked {
                request,
                already_retried,
            },
        ) => {
            if *already_retried {
                Ok(Transition::to(EngineState::Failed(
                    FailureReason::InsufficientInformation {
                        field: request.field,
                    },
                ))
                .with(Effect::ComposeAnswer)
                .with(Effect::DiscardSession))
            } else {
                Ok(Transition::to(EngineState::AwaitingInput {
                    step: *step,
                    total: *total,
                    request: request.clone(),
                })
                .with(Effect::PersistSnapshot)
                .with(Effect::EmitPrompt(request.clone())))
            }
        }

        (EngineState::AwaitingInput { step, total, .. }, EngineEvent::FieldSupplied { .. }) => {
            Ok(Transition::to(EngineState::Executing {
                step: *step,
                total: *total,
            })
            .with(Effect::RunStep(*step)))
        }

        (EngineState::Aggregating, EngineEvent::AllStepsErrored) => Ok(Transition::to(
            EngineState::Failed(FailureReason::AllAgentsFailed),
        )
        .with(Effect::ComposeAnswer)),
        (EngineState::Aggregating, EngineEvent::AnswerComposed) => {
            Ok(Transition::to(EngineState::Done).with(Effect::DiscardSession))
        }

        _ => invalid(state, &event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRole;

    fn request() -> MissingFieldRequest {
        MissingFieldRequest::new(AgentRole::Shipping, EntityField::OrderId)
    }

    fn assert_step(state: &EngineState, expected: usize) {
        match state {
            EngineState::Executing { step, .. } => assert_eq!(*step, expected),
            other => panic!("expected executing state, got {}", other),
        }
    }

    #[test]
    fn test_happy_path() {
        let t = transition(&EngineState::Parsing, EngineEvent::IntentParsed).unwrap();
        assert_eq!(t.next, EngineState::Resolving);
        assert_eq!(t.effects, vec![Effect::ResolvePlan]);

        let t = transition(&t.next, EngineEvent::PlanResolved { total: 2 }).unwrap();
        assert_step(&t.next, 0);
        assert_eq!(t.effects, vec![Effect::RunStep(0)]);

        let t = transition(&t.next, EngineEvent::StepFinished { step: 0 }).unwrap();
        assert_step(&t.next, 1);

        let t = transition(&t.next, EngineEvent::StepFinished { step: 1 }).unwrap();
        assert_eq!(t.next, EngineState::Aggregating);
        assert_eq!(t.effects, vec![Effect::ComposeAnswer]);

        let t = transition(&t.next, EngineEvent::AnswerComposed).unwrap();
        assert_eq!(t.next, EngineState::Done);
        assert_eq!(t.effects, vec![Effect::DiscardSession]);
    }

    #[test]
    fn test_skip_advances_like_finish() {
        let state = EngineState::Executing { step: 0, total: 2 };
        let t = transition(&state, EngineEvent::StepSkipped { step: 0 }).unwrap();
        assert_step(&t.next, 1);
    }

    #[test]
    fn test_block_suspends_then_resume_reruns() {
        let state = EngineState::Executing { step: 1, total: 3 };
        let t = transition(
            &state,
            EngineEvent::StepBlocked {
                request: request(),
                already_retried: false,
            },
        )
        .unwrap();
        match &t.next {
            EngineState::AwaitingInput { step, request, .. } => {
                assert_eq!(*step, 1);
                assert_eq!(request.field, EntityField::OrderId);
            }
            other => panic!("expected awaiting_input, got {}", other),
        }
        assert_eq!(t.effects.len(), 2);
        assert_eq!(t.effects[0], Effect::PersistSnapshot);
        assert!(matches!(t.effects[1], Effect::EmitPrompt(_)));

        let t = transition(
            &t.next,
            EngineEvent::FieldSupplied {
                field: EntityField::OrderId,
            },
        )
        .unwrap();
        assert_step(&t.next, 1);
        assert_eq!(t.effects, vec![Effect::RunStep(1)]);
    }

    #[test]
    fn test_second_block_fails_with_missing_field() {
        let state = EngineState::Executing { step: 0, total: 1 };
        let t = transition(
            &state,
            EngineEvent::StepBlocked {
                request: request(),
                already_retried: true,
            },
        )
        .unwrap();
        assert_eq!(
            t.next,
            EngineState::Failed(FailureReason::InsufficientInformation {
                field: EntityField::OrderId
            })
        );
        assert!(t.effects.contains(&Effect::ComposeAnswer));
        assert!(t.effects.contains(&Effect::DiscardSession));
    }

    #[test]
    fn test_deferral_stays_on_same_index() {
        let state = EngineState::Executing { step: 1, total: 3 };
        let t = transition(&state, EngineEvent::StepDeferred { step: 1 }).unwrap();
        assert_step(&t.next, 1);
        assert_eq!(t.effects, vec![Effect::RunStep(1)]);
    }

    #[test]
    fn test_resolve_failures() {
        let t = transition(
            &EngineState::Resolving,
            EngineEvent::ResolveFailed(FailureReason::NoApplicableAgent),
        )
        .unwrap();
        assert_eq!(t.next, EngineState::Failed(FailureReason::NoApplicableAgent));

        let t = transition(
            &EngineState::Resolving,
            EngineEvent::ResolveFailed(FailureReason::CyclicDependency),
        )
        .unwrap();
        assert_eq!(t.next, EngineState::Failed(FailureReason::CyclicDependency));
    }

    #[test]
    fn test_all_steps_errored_fails_from_aggregating() {
        let t = transition(&EngineState::Aggregating, EngineEvent::AllStepsErrored).unwrap();
        assert_eq!(t.next, EngineState::Failed(FailureReason::AllAgentsFailed));
        assert_eq!(t.effects, vec![Effect::ComposeAnswer]);
    }

    #[test]
    fn test_cancel_from_any_live_state() {
        for state in [
            EngineState::Parsing,
            EngineState::Resolving,
            EngineState::Executing { step: 0, total: 2 },
            EngineState::Aggregating,
        ] {
            let t = transition(&state, EngineEvent::Cancelled).unwrap();
            assert_eq!(t.next, EngineState::Failed(FailureReason::Cancelled));
        }
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let err = transition(&EngineState::Done, EngineEvent::IntentParsed).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));

        let failed = EngineState::Failed(FailureReason::AllAgentsFailed);
        let err = transition(&failed, EngineEvent::Cancelled).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_out_of_order_settlement_rejected() {
        let state = EngineState::Executing { step: 0, total: 3 };
        let err = transition(&state, EngineEvent::StepFinished { step: 2 }).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                state: "executing".to_string(),
                event: "step_finished".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_plan_rejected() {
        let err = transition(&EngineState::Resolving, EngineEvent::PlanResolved { total: 0 })
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }
}
