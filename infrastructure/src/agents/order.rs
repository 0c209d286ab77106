//! Order desk agent backed by the ShopCore store.

use crate::agents::{parse_id, record};
use crate::stores::OrderStore;
use async_trait::async_trait;
use crossdesk_application::ports::domain_agent::{AgentError, DomainAgent};
use crossdesk_domain::{AgentResult, AgentRole, EntityField, Operation};
use std::collections::BTreeMap;

/// Resolves orders and accounts.
///
/// Given an order number the lookup is direct. Given only an email or user
/// ID, the agent resolves the account and reports the most recent order,
/// publishing both `UserID` and `OrderID` for the desks downstream.
pub struct OrderAgent {
    store: OrderStore,
}

impl OrderAgent {
    pub fn new() -> Self {
        Self {
            store: OrderStore::seeded(),
        }
    }

    fn lookup_by_order(&self, operation: Operation, raw: &str) -> Result<AgentResult, AgentError> {
        let id = parse_id(EntityField::OrderId, raw)?;
        Ok(match self.store.order_by_id(id) {
            Some(order) => AgentResult::found(AgentRole::Order, operation)
                .with_field(EntityField::UserId, order.user_id.to_string())
                .with_field(EntityField::OrderId, order.order_id.to_string())
                .with_records(vec![record(order)]),
            None => AgentResult::not_found(
                AgentRole::Order,
                operation,
                format!("no order {} on file", id),
            ),
        })
    }

    fn lookup_by_account(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError> {
        let user = if let Some(email) = params.get(&EntityField::Email) {
            match self.store.user_by_email(email) {
                Some(user) => user,
                None => {
                    return Ok(AgentResult::not_found(
                        AgentRole::Order,
                        operation,
                        "no account with that email address",
                    ));
                }
            }
        } else if let Some(raw) = params.get(&EntityField::UserId) {
            let id = parse_id(EntityField::UserId, raw)?;
            match self.store.user_by_id(id) {
                Some(user) => user,
                None => {
                    return Ok(AgentResult::not_found(
                        AgentRole::Order,
                        operation,
                        format!("no user {} on file", id),
                    ));
                }
            }
        } else {
            return Err(AgentError::MalformedParams(
                "order lookup needs an order number, email, or user ID".to_string(),
            ));
        };

        Ok(match self.store.latest_order_for_user(user.user_id) {
            Some(order) => AgentResult::found(AgentRole::Order, operation)
                .with_field(EntityField::UserId, user.user_id.to_string())
                .with_field(EntityField::OrderId, order.order_id.to_string())
                .with_records(vec![record(order)])
                .with_note("latest order for the account"),
            None => AgentResult::found(AgentRole::Order, operation)
                .with_field(EntityField::UserId, user.user_id.to_string())
                .with_records(vec![record(user)])
                .with_note("no orders on file for this account"),
        })
    }
}

impl Default for OrderAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainAgent for OrderAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Order
    }

    async fn query(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError> {
        // An explicit order number beats account resolution.
        match params.get(&EntityField::OrderId) {
            Some(raw) => self.lookup_by_order(operation, raw),
            None => self.lookup_by_account(operation, params),
        }
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
    async fn test_direct_order_lookup_publishes_both_ids() {
        let agent = OrderAgent::new();
        let result = agent
            .query(Operation::OrderLookup, &params(&[(EntityField::OrderId, "1")]))
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert_eq!(result.fields.get(&EntityField::UserId).unwrap(), "1");
        assert_eq!(result.fields.get(&EntityField::OrderId).unwrap(), "1");
        assert_eq!(result.records[0]["Status"], "Delivered");
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let agent = OrderAgent::new();
        let result = agent
            .query(
                Operation::OrderLookup,
                &params(&[(EntityField::OrderId, "9999")]),
            )
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::NotFound);
        assert!(result.note.as_deref().unwrap().contains("9999"));
        assert!(result.fields.is_empty());
    }

    #[tokio::test]
    async fn test_email_resolves_latest_order() {
        let agent = OrderAgent::new();
        let result = agent
            .query(
                Operation::OrderLookup,
                &params(&[(EntityField::Email, "alice@example.com")]),
            )
            .await
            .unwrap();
        assert_eq!(result.fields.get(&EntityField::UserId).unwrap(), "1");
        // Alice's newest order, not her first.
        assert_eq!(result.fields.get(&EntityField::OrderId).unwrap(), "7");
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let agent = OrderAgent::new();
        let result = agent
            .query(
                Operation::OrderLookup,
                &params(&[(EntityField::Email, "ghost@example.com")]),
            )
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::NotFound);
    }

    #[tokio::test]
    async fn test_unparseable_order_id_is_malformed() {
        let agent = OrderAgent::new();
        let err = agent
            .query(
                Operation::OrderLookup,
                &params(&[(EntityField::OrderId, "last one")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MalformedParams(_)));
    }
}
