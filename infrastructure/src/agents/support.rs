//! Support desk agent backed by the CareDesk store.

use crate::agents::{parse_id, record};
use crate::stores::{SupportStore, TicketRow};
use async_trait::async_trait;
use crossdesk_application::ports::domain_agent::{AgentError, DomainAgent};
use crossdesk_domain::{AgentResult, AgentRole, EntityField, Operation};
use std::collections::BTreeMap;

/// Looks up support tickets by ticket number or account.
///
/// Account queries return open tickets only; a closed history is not an
/// open case. When the context already knows which order the customer is
/// asking about, tickets referencing that order are preferred over the
/// rest of the account's open cases.
pub struct SupportAgent {
    store: SupportStore,
}

impl SupportAgent {
    pub fn new() -> Self {
        Self {
            store: SupportStore::seeded(),
        }
    }

    fn found(&self, operation: Operation, tickets: Vec<&TicketRow>) -> AgentResult {
        let mut result = AgentResult::found(AgentRole::Support, operation)
            .with_records(tickets.iter().map(|t| record(*t)).collect());
        if let Some(first) = tickets.first() {
            result = result.with_field(EntityField::TicketId, first.ticket_id.to_string());
        }
        result
    }

    fn lookup_for_user(
        &self,
        operation: Operation,
        user_id: u32,
        order_id: Option<u32>,
    ) -> AgentResult {
        let open = self.store.open_tickets_for_user(user_id);
        if open.is_empty() {
            return AgentResult::not_found(
                AgentRole::Support,
                operation,
                "no open tickets for this account",
            );
        }

        if let Some(order_id) = order_id {
            let referencing: Vec<&TicketRow> = open
                .iter()
                .copied()
                .filter(|t| t.reference_id == order_id)
                .collect();
            if !referencing.is_empty() {
                return self
                    .found(operation, referencing)
                    .with_note(format!("open tickets referencing order {}", order_id));
            }
        }
        self.found(operation, open)
    }
}

impl Default for SupportAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainAgent for SupportAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Support
    }

    async fn query(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError> {
        if let Some(raw) = params.get(&EntityField::TicketId) {
            let id = parse_id(EntityField::TicketId, raw)?;
            return Ok(match self.store.ticket_by_id(id) {
                Some(ticket) => AgentResult::found(AgentRole::Support, operation)
                    .with_field(EntityField::TicketId, ticket.ticket_id.to_string())
                    .with_records(vec![record(ticket)]),
                None => AgentResult::not_found(
                    AgentRole::Support,
                    operation,
                    format!("no ticket {} on file", id),
                ),
            });
        }

        let Some(raw_user) = params.get(&EntityField::UserId) else {
            return Err(AgentError::MalformedParams(
                "ticket lookup needs a ticket number or user ID".to_string(),
            ));
        };
        let user_id = parse_id(EntityField::UserId, raw_user)?;
        let order_id = match params.get(&EntityField::OrderId) {
            Some(raw) => Some(parse_id(EntityField::OrderId, raw)?),
            None => None,
        };
        Ok(self.lookup_for_user(operation, user_id, order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossdesk_domain::ResultStatus;

    fn params(pairs: &[(EntityField, &str)]) -> BTreeMap<EntityField, String> {
        pairs
            .iter()
            .map(|(field, value)| (*field, value.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_direct_ticket_lookup() {
        let agent = SupportAgent::new();
        let result = agent
            .query(Operation::TicketLookup, &params(&[(EntityField::TicketId, "2")]))
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert_eq!(result.records[0]["Status"], "Open");
    }

    #[tokio::test]
    async fn test_closed_history_is_no_open_tickets() {
        let agent = SupportAgent::new();
        // Alice's only ticket is closed.
        let result = agent
            .query(Operation::TicketLookup, &params(&[(EntityField::UserId, "1")]))
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::NotFound);
        assert_eq!(result.note.as_deref(), Some("no open tickets for this account"));
    }

    #[tokio::test]
    async fn test_open_tickets_publish_ticket_id() {
        let agent = SupportAgent::new();
        let result = agent
            .query(Operation::TicketLookup, &params(&[(EntityField::UserId, "3")]))
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert_eq!(result.fields.get(&EntityField::TicketId).unwrap(), "3");
    }

    #[tokio::test]
    async fn test_known_order_narrows_the_tickets() {
        let agent = SupportAgent::new();
        let result = agent
            .query(
                Operation::TicketLookup,
                &params(&[(EntityField::UserId, "3"), (EntityField::OrderId, "3")]),
            )
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert!(result.note.as_deref().unwrap().contains("order 3"));

        // An unrelated order falls back to all open tickets.
        let result = agent
            .query(
                Operation::TicketLookup,
                &params(&[(EntityField::UserId, "3"), (EntityField::OrderId, "1")]),
            )
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert!(result.note.is_none());
    }
}
