//! Dependency resolution: from required roles to an ordered execution plan.

use crate::agent::{
    AgentRole, DependencyEdge, EdgeKind, Operation, declared_edges,
};
use crate::core::error::EngineError;
use crate::query::QueryIntent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One scheduled agent run inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub role: AgentRole,
    pub operation: Operation,
    /// In-plan producers whose published fields this step may need. These
    /// gate execution: the step cannot be dispatched before they settle.
    pub requires_data_from: Vec<AgentRole>,
    /// Every in-plan producer ordered before this step, context sources
    /// included. Ordering only; never gates.
    pub ordered_after: Vec<AgentRole>,
}

impl PlanStep {
    /// True when none of this step's gating producers appear in the plan.
    pub fn is_independent(&self) -> bool {
        self.requires_data_from.is_empty()
    }
}

/// A topologically ordered list of agent runs.
///
/// Steps are unique per role. The order respects every declared edge in
/// the induced subgraph, with the role priority breaking ties between
/// equally ready steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&PlanStep> {
        self.steps.get(index)
    }

    pub fn roles(&self) -> Vec<AgentRole> {
        self.steps.iter().map(|s| s.role).collect()
    }

    pub fn position_of(&self, role: AgentRole) -> Option<usize> {
        self.steps.iter().position(|s| s.role == role)
    }

    /// The plan suffix starting at `index`, used when suspending a run.
    pub fn suffix_from(&self, index: usize) -> ExecutionPlan {
        ExecutionPlan {
            steps: self.steps.get(index..).unwrap_or_default().to_vec(),
        }
    }

    /// Every role that transitively needs `role`'s published fields, the
    /// role itself included. Context edges do not count: a step that only
    /// reads another's findings can still run without them.
    pub fn data_dependents_of(&self, role: AgentRole) -> BTreeSet<AgentRole> {
        let mut closed = BTreeSet::from([role]);
        // Steps are topologically sorted, so one forward sweep suffices.
        for step in &self.steps {
            if step.requires_data_from.iter().any(|r| closed.contains(r)) {
                closed.insert(step.role);
            }
        }
        closed
    }

    /// Moves the step at `index` and everything data-dependent on it
    /// behind the remaining runnable steps, keeping relative order on both
    /// sides. A context consumer may jump ahead of its producer here; it
    /// simply answers without the enrichment.
    ///
    /// Returns false without touching the plan when no runnable step
    /// follows, meaning a blocked step at `index` has nothing left to
    /// yield to.
    pub fn defer(&mut self, index: usize) -> bool {
        let Some(step) = self.steps.get(index) else {
            return false;
        };
        let blocked = self.data_dependents_of(step.role);
        let suffix = self.steps.split_off(index);
        let (held, runnable): (Vec<PlanStep>, Vec<PlanStep>) = suffix
            .into_iter()
            .partition(|s| blocked.contains(&s.role));
        let moved = !runnable.is_empty();
        self.steps.extend(runnable);
        self.steps.extend(held);
        moved
    }
}

/// Resolves the intent's required roles into an ordered plan.
///
/// Only edges whose endpoints are both required survive; producers the
/// intent does not name never get pulled in, because their output can
/// come from the query itself or a follow-up instead.
pub fn resolve(intent: &QueryIntent) -> Result<ExecutionPlan, EngineError> {
    if intent.required_agents.is_empty() {
        return Err(EngineError::NoApplicableAgent);
    }
    let roles: BTreeSet<AgentRole> = intent.required_agents.iter().copied().collect();
    let edges: Vec<DependencyEdge> = declared_edges()
        .into_iter()
        .filter(|e| roles.contains(&e.producer) && roles.contains(&e.consumer))
        .collect();
    resolve_with_edges(intent, &roles, &edges)
}

fn resolve_with_edges(
    intent: &QueryIntent,
    roles: &BTreeSet<AgentRole>,
    edges: &[DependencyEdge],
) -> Result<ExecutionPlan, EngineError> {
    let mut remaining: BTreeSet<AgentRole> = roles.clone();
    let mut ordered: Vec<AgentRole> = Vec::with_capacity(roles.len());

    while !remaining.is_empty() {
        // Ready means every in-plan producer has already been scheduled.
        // Among ready roles the fixed priority picks the winner, so plans
        // stay deterministic regardless of intent ordering.
        let next = remaining
            .iter()
            .copied()
            .filter(|role| {
                edges
                    .iter()
                    .filter(|e| e.consumer == *role)
                    .all(|e| !remaining.contains(&e.producer))
            })
            .min_by_key(|role| role.priority());

        match next {
            Some(role) => {
                remaining.remove(&role);
                ordered.push(role);
            }
            None => {
                let stuck: Vec<&str> = remaining.iter().map(|r| r.as_str()).collect();
                return Err(EngineError::CyclicDependency {
                    roles: stuck.join(", "),
                });
            }
        }
    }

    let steps = ordered
        .iter()
        .map(|role| {
            let mut requires_data_from: Vec<AgentRole> = edges
                .iter()
                .filter(|e| e.consumer == *role && matches!(e.kind, EdgeKind::Data(_)))
                .map(|e| e.producer)
                .collect();
            requires_data_from.sort_by_key(|r| r.priority());
            requires_data_from.dedup();

            let mut ordered_after: Vec<AgentRole> = edges
                .iter()
                .filter(|e| e.consumer == *role)
                .map(|e| e.producer)
                .collect();
            ordered_after.sort_by_key(|r| r.priority());
            ordered_after.dedup();

            PlanStep {
                role: *role,
                operation: intent.operation_for(*role),
                requires_data_from,
                ordered_after,
            }
        })
        .collect();

    Ok(ExecutionPlan { steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::EntityField;

    fn intent_with(roles: &[AgentRole]) -> QueryIntent {
        let mut intent = QueryIntent::new("test query");
        for role in roles {
            intent = intent.with_agent(*role);
        }
        intent
    }

    #[test]
    fn test_empty_intent_has_no_applicable_agent() {
        let err = resolve(&QueryIntent::new("hello")).unwrap_err();
        assert_eq!(err, EngineError::NoApplicableAgent);
    }

    #[test]
    fn test_single_role_plan() {
        let plan = resolve(&intent_with(&[AgentRole::Shipping])).unwrap();
        assert_eq!(plan.roles(), vec![AgentRole::Shipping]);
        assert!(plan.steps[0].is_independent());
    }

    #[test]
    fn test_order_runs_before_dependents() {
        let plan = resolve(&intent_with(&[
            AgentRole::Support,
            AgentRole::Shipping,
            AgentRole::Order,
        ]))
        .unwrap();
        assert_eq!(
            plan.roles(),
            vec![AgentRole::Order, AgentRole::Shipping, AgentRole::Support]
        );
        let shipping = &plan.steps[1];
        assert_eq!(shipping.requires_data_from, vec![AgentRole::Order]);
    }

    #[test]
    fn test_priority_breaks_ties() {
        // Payment and Support are both ready once Order settles; the
        // fixed priority puts Payment first.
        let plan = resolve(&intent_with(&[
            AgentRole::Support,
            AgentRole::Payment,
            AgentRole::Order,
        ]))
        .unwrap();
        assert_eq!(
            plan.roles(),
            vec![AgentRole::Order, AgentRole::Payment, AgentRole::Support]
        );
    }

    #[test]
    fn test_context_edges_order_but_do_not_gate() {
        let plan = resolve(&intent_with(&[AgentRole::Support, AgentRole::Shipping])).unwrap();
        // Shipping enriches Support, so it runs first, but Support is not
        // gated on it.
        assert_eq!(plan.roles(), vec![AgentRole::Shipping, AgentRole::Support]);
        let support = &plan.steps[1];
        assert!(support.requires_data_from.is_empty());
        assert_eq!(support.ordered_after, vec![AgentRole::Shipping]);
    }

    #[test]
    fn test_absent_producer_leaves_consumer_independent() {
        // Shipping alone: the order desk is not in the plan, so the order
        // number must come from the query or a follow-up.
        let plan = resolve(&intent_with(&[AgentRole::Shipping, AgentRole::Payment])).unwrap();
        assert!(plan.steps.iter().all(|s| s.requires_data_from.is_empty()));
        assert_eq!(plan.roles(), vec![AgentRole::Shipping, AgentRole::Payment]);
    }

    #[test]
    fn test_synthetic_cycle_is_reported() {
        let intent = intent_with(&[AgentRole::Order, AgentRole::Shipping]);
        let roles: BTreeSet<AgentRole> = intent.required_agents.iter().copied().collect();
        let edges = vec![
            DependencyEdge {
                producer: AgentRole::Order,
                consumer: AgentRole::Shipping,
                kind: EdgeKind::Data(EntityField::OrderId),
            },
            DependencyEdge {
                producer: AgentRole::Shipping,
                consumer: AgentRole::Order,
                kind: EdgeKind::Data(EntityField::TrackingNumber),
            },
        ];
        let err = resolve_with_edges(&intent, &roles, &edges).unwrap_err();
        assert!(matches!(err, EngineError::CyclicDependency { .. }));
    }

    #[test]
    fn test_defer_moves_dependents_en_bloc() {
        let mut plan = resolve(&intent_with(&[
            AgentRole::Order,
            AgentRole::Shipping,
            AgentRole::Support,
        ]))
        .unwrap();
        assert_eq!(
            plan.roles(),
            vec![AgentRole::Order, AgentRole::Shipping, AgentRole::Support]
        );
        // Blocking Order defers Shipping and Support too: nothing is left
        // to run ahead of it.
        assert!(!plan.defer(0));
        assert_eq!(
            plan.roles(),
            vec![AgentRole::Order, AgentRole::Shipping, AgentRole::Support]
        );
    }

    #[test]
    fn test_defer_yields_to_independent_step() {
        let mut plan = resolve(&intent_with(&[
            AgentRole::Order,
            AgentRole::Shipping,
            AgentRole::Support,
        ]))
        .unwrap();
        // Shipping blocked at index 1: Support only has a context edge on
        // Shipping, so it may run first while the user is asked.
        assert!(plan.defer(1));
        assert_eq!(
            plan.roles(),
            vec![AgentRole::Order, AgentRole::Support, AgentRole::Shipping]
        );
    }

    #[test]
    fn test_suffix_from() {
        let plan = resolve(&intent_with(&[
            AgentRole::Order,
            AgentRole::Shipping,
            AgentRole::Support,
        ]))
        .unwrap();
        let suffix = plan.suffix_from(1);
        assert_eq!(suffix.roles(), vec![AgentRole::Shipping, AgentRole::Support]);
        assert!(plan.suffix_from(9).is_empty());
    }
}
