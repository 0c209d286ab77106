//! Missing-information detection for plan steps.
//!
//! Before a step is dispatched its required fields are checked against the
//! execution context. A step short on information does not fail the run;
//! it produces a follow-up request the engine can suspend on.

use crate::agent::{AgentRole, EntityField};
use crate::orchestration::context::ExecutionContext;
use crate::orchestration::resolver::PlanStep;
use serde::{Deserialize, Serialize};

/// A follow-up question for the customer, tied to the field and the step
/// that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFieldRequest {
    pub field: EntityField,
    pub role: AgentRole,
    pub prompt: String,
}

impl MissingFieldRequest {
    pub fn new(role: AgentRole, field: EntityField) -> Self {
        Self {
            field,
            role,
            prompt: prompt_for(role, field),
        }
    }
}

/// Outcome of checking a step against the context.
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    Ready,
    NeedsField(MissingFieldRequest),
}

/// Checks whether every required group of the step's operation has at
/// least one known field.
///
/// The first unsatisfied group produces the request; one question at a
/// time keeps follow-ups short. Inside a group the asked-for field is the
/// group's first alternative, except that account-level queries prefer the
/// email address when the group offers it, since customers rarely know
/// their numeric IDs.
pub fn check_ready(step: &PlanStep, ctx: &ExecutionContext) -> Readiness {
    for group in step.operation.required_groups() {
        if group.iter().any(|field| ctx.has(*field)) {
            continue;
        }
        let field = field_to_request(group, ctx);
        return Readiness::NeedsField(MissingFieldRequest::new(step.role, field));
    }
    Readiness::Ready
}

fn field_to_request(group: &[EntityField], ctx: &ExecutionContext) -> EntityField {
    if ctx.prefer_email() && group.contains(&EntityField::Email) {
        return EntityField::Email;
    }
    group[0]
}

fn prompt_for(role: AgentRole, field: EntityField) -> String {
    let purpose = match role {
        AgentRole::Order => "look up the order",
        AgentRole::Shipping => "track the shipment",
        AgentRole::Payment => "check the payment records",
        AgentRole::Support => "find the support tickets",
    };
    format!("To {}, could you share the {}?", purpose, field.describe())
}

/// Folds several blocked steps into a single question.
///
/// The first request stays primary (its field is what a resumed session
/// fills first); prompts for other distinct fields are appended so the
/// customer sees everything that is needed at once.
pub fn consolidate(requests: &[MissingFieldRequest]) -> Option<MissingFieldRequest> {
    let (first, rest) = requests.split_first()?;
    let mut combined = first.clone();
    let mut seen = vec![first.field];
    for request in rest {
        if seen.contains(&request.field) {
            continue;
        }
        seen.push(request.field);
        combined.prompt.push(' ');
        combined.prompt.push_str(&request.prompt);
    }
    Some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Operation;
    use crate::query::QueryIntent;

    fn step(role: AgentRole, operation: Operation) -> PlanStep {
        PlanStep {
            role,
            operation,
            requires_data_from: vec![],
            ordered_after: vec![],
        }
    }

    #[test]
    fn test_ready_when_any_alternative_known() {
        let intent = QueryIntent::new("order status for alice@example.com")
            .with_agent(AgentRole::Order)
            .with_entity(EntityField::Email, "alice@example.com");
        let ctx = ExecutionContext::for_intent(&intent);
        let readiness = check_ready(&step(AgentRole::Order, Operation::OrderLookup), &ctx);
        assert_eq!(readiness, Readiness::Ready);
    }

    #[test]
    fn test_blocked_step_names_first_alternative() {
        let intent = QueryIntent::new("where is my package").with_agent(AgentRole::Shipping);
        let ctx = ExecutionContext::for_intent(&intent);
        match check_ready(&step(AgentRole::Shipping, Operation::ShipmentLookup), &ctx) {
            Readiness::NeedsField(request) => {
                assert_eq!(request.field, EntityField::OrderId);
                assert_eq!(request.role, AgentRole::Shipping);
                assert!(request.prompt.contains("order number"));
            }
            Readiness::Ready => panic!("expected a follow-up request"),
        }
    }

    #[test]
    fn test_account_level_prefers_email_when_offered() {
        // A refund question with no identifiers at all: the order desk
        // resolves the account, and customers know their email better
        // than an order number.
        let intent = QueryIntent::new("was I refunded")
            .with_agent(AgentRole::Payment)
            .with_agent(AgentRole::Order);
        let ctx = ExecutionContext::for_intent(&intent);
        assert!(ctx.prefer_email());
        match check_ready(&step(AgentRole::Order, Operation::OrderLookup), &ctx) {
            Readiness::NeedsField(request) => {
                assert_eq!(request.field, EntityField::Email);
                assert!(request.prompt.contains("email address"));
            }
            Readiness::Ready => panic!("expected a follow-up request"),
        }
    }

    #[test]
    fn test_group_without_email_asks_first_alternative() {
        let intent = QueryIntent::new("do I have open tickets").with_agent(AgentRole::Support);
        let ctx = ExecutionContext::for_intent(&intent);
        assert!(ctx.prefer_email());
        match check_ready(&step(AgentRole::Support, Operation::TicketLookup), &ctx) {
            Readiness::NeedsField(request) => {
                assert_eq!(request.field, EntityField::TicketId);
            }
            Readiness::Ready => panic!("expected a follow-up request"),
        }
    }

    #[test]
    fn test_refund_checks_groups_in_order() {
        let intent = QueryIntent::new("was my refund processed")
            .with_operation(Operation::RefundLookup);
        let mut ctx = ExecutionContext::for_intent(&intent);
        let refund = step(AgentRole::Payment, Operation::RefundLookup);

        match check_ready(&refund, &ctx) {
            Readiness::NeedsField(request) => assert_eq!(request.field, EntityField::UserId),
            Readiness::Ready => panic!("expected a follow-up request"),
        }

        ctx.record_entity(EntityField::UserId, "1");
        match check_ready(&refund, &ctx) {
            Readiness::NeedsField(request) => {
                assert_eq!(request.field, EntityField::PaymentMethodId);
                assert!(request.prompt.contains("payment method ID"));
            }
            Readiness::Ready => panic!("expected a follow-up request"),
        }

        ctx.record_entity(EntityField::PaymentMethodId, "1");
        assert_eq!(check_ready(&refund, &ctx), Readiness::Ready);
    }

    #[test]
    fn test_consolidate_dedupes_fields() {
        let shipping = MissingFieldRequest::new(AgentRole::Shipping, EntityField::OrderId);
        let order = MissingFieldRequest::new(AgentRole::Order, EntityField::OrderId);
        let payment = MissingFieldRequest::new(AgentRole::Payment, EntityField::UserId);

        let combined = consolidate(&[shipping.clone(), order, payment]).unwrap();
        assert_eq!(combined.field, EntityField::OrderId);
        assert_eq!(combined.role, AgentRole::Shipping);
        assert!(combined.prompt.contains("track the shipment"));
        assert!(!combined.prompt.contains("look up the order"));
        assert!(combined.prompt.contains("payment records"));

        assert!(consolidate(&[]).is_none());
        let single = consolidate(std::slice::from_ref(&shipping)).unwrap();
        assert_eq!(single, shipping);
    }
}
