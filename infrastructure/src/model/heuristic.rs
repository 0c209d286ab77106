//! Offline intent extraction and phrasing.
//!
//! A small keyword matcher that stands in for the model whenever no
//! backend is configured or reachable. Identifiers come from a handful of
//! fixed patterns, routing comes from desk vocabulary, and answers use the
//! deterministic template wording. The matcher never fails, which makes it
//! the safety net behind [`super::RoutedModel`].

use async_trait::async_trait;
use crossdesk_application::ports::language_model::{LanguageModel, ModelError};
use crossdesk_domain::{
    AgentRole, EntityField, Operation, QueryIntent, StructuredFacts, render_template,
};
use regex::Regex;

const REFUND_TERMS: &[&str] = &["refund", "reimburse", "money back"];
const PAYMENT_TERMS: &[&str] = &["payment", "charge", "billing", "transaction", "wallet", "balance"];
const SHIPPING_TERMS: &[&str] = &["where is", "track", "ship", "deliver", "package", "arrive"];
const ORDER_TERMS: &[&str] = &["order", "purchase", "bought"];
const SUPPORT_TERMS: &[&str] = &["ticket", "support", "complaint", "case"];

pub struct HeuristicModel {
    order_id: Regex,
    ticket_id: Regex,
    user_id: Regex,
    method_id: Regex,
    email: Regex,
}

impl HeuristicModel {
    pub fn new() -> Self {
        Self {
            order_id: Regex::new(r"(?i)order\s*#?\s*(\d+)").expect("hardwired pattern"),
            ticket_id: Regex::new(r"(?i)ticket\s*#?\s*(\d+)").expect("hardwired pattern"),
            user_id: Regex::new(r"(?i)user\s*#?\s*(\d+)").expect("hardwired pattern"),
            method_id: Regex::new(r"(?i)method\s*#?\s*(\d+)").expect("hardwired pattern"),
            email: Regex::new(r"[A-Za-z0-9][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("hardwired pattern"),
        }
    }
}

impl Default for HeuristicModel {
    fn default() -> Self {
        Self::new()
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn contains_any(lowered: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| lowered.contains(t))
}

/// Pulls in the order desk when another desk needs fields only it can
/// resolve from what the query carries. The plan resolver never adds
/// producers on its own, so this is where "my refund" plus an email turns
/// into an identity lookup followed by the refund check.
fn complete(intent: QueryIntent) -> QueryIntent {
    let needs_order_number = intent.required_agents.contains(&AgentRole::Shipping);
    let needs_identity = (intent.required_agents.contains(&AgentRole::Payment)
        && !intent.has_entity(EntityField::UserId))
        || (intent.required_agents.contains(&AgentRole::Support)
            && !intent.has_entity(EntityField::TicketId)
            && !intent.has_entity(EntityField::UserId));
    if needs_order_number || needs_identity {
        intent.with_agent(AgentRole::Order)
    } else {
        intent
    }
}

#[async_trait]
impl LanguageModel for HeuristicModel {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn extract_intent(&self, raw_text: &str) -> Result<QueryIntent, ModelError> {
        let lowered = raw_text.to_lowercase();
        let mut intent = QueryIntent::new(raw_text);

        if let Some(id) = capture(&self.order_id, raw_text) {
            intent = intent.with_entity(EntityField::OrderId, id);
        }
        if let Some(id) = capture(&self.ticket_id, raw_text) {
            intent = intent.with_entity(EntityField::TicketId, id);
        }
        if let Some(id) = capture(&self.user_id, raw_text) {
            intent = intent.with_entity(EntityField::UserId, id);
        }
        if let Some(id) = capture(&self.method_id, raw_text) {
            intent = intent.with_entity(EntityField::PaymentMethodId, id);
        }
        if let Some(m) = self.email.find(raw_text) {
            intent = intent.with_entity(EntityField::Email, m.as_str());
        }

        if contains_any(&lowered, REFUND_TERMS) {
            intent = intent.with_operation(Operation::RefundLookup);
        } else if contains_any(&lowered, PAYMENT_TERMS) {
            intent = intent.with_agent(AgentRole::Payment);
        }
        if contains_any(&lowered, SHIPPING_TERMS) {
            intent = intent.with_agent(AgentRole::Shipping);
        }
        if contains_any(&lowered, ORDER_TERMS) || intent.has_entity(EntityField::OrderId) {
            intent = intent.with_agent(AgentRole::Order);
        }
        if contains_any(&lowered, SUPPORT_TERMS) || intent.has_entity(EntityField::TicketId) {
            intent = intent.with_agent(AgentRole::Support);
        }

        Ok(complete(intent))
    }

    async fn phrase_answer(&self, facts: &StructuredFacts) -> Result<String, ModelError> {
        Ok(render_template(facts))
    }
}
