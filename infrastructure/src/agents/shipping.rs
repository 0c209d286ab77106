//! Shipping desk agent backed by the ShipStream store.

use crate::agents::{parse_id, record};
use crate::stores::ShippingStore;
use async_trait::async_trait;
use crossdesk_application::ports::domain_agent::{AgentError, DomainAgent};
use crossdesk_domain::{AgentResult, AgentRole, EntityField, Operation};
use std::collections::BTreeMap;

/// Looks up the shipment for an order and publishes its tracking number.
pub struct ShippingAgent {
    store: ShippingStore,
}

impl ShippingAgent {
    pub fn new() -> Self {
        Self {
            store: ShippingStore::seeded(),
        }
    }
}

impl Default for ShippingAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainAgent for ShippingAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Shipping
    }

    async fn query(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError> {
        let Some(raw) = params.get(&EntityField::OrderId) else {
            return Err(AgentError::MalformedParams(
                "shipment lookup needs an order number".to_string(),
            ));
        };
        let order_id = parse_id(EntityField::OrderId, raw)?;

        Ok(match self.store.shipment_for_order(order_id) {
            Some(shipment) => AgentResult::found(AgentRole::Shipping, operation)
                .with_field(
                    EntityField::TrackingNumber,
                    shipment.tracking_number.to_string(),
                )
                .with_records(vec![record(shipment)]),
            None => AgentResult::not_found(
                AgentRole::Shipping,
                operation,
                format!("no shipment for order {}", order_id),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossdesk_domain::ResultStatus;

    #[tokio::test]
    async fn test_shipment_lookup_publishes_tracking_number() {
        let agent = ShippingAgent::new();
        let params = BTreeMap::from([(EntityField::OrderId, "1".to_string())]);
        let result = agent.query(Operation::ShipmentLookup, &params).await.unwrap();
        assert_eq!(result.status, ResultStatus::Found);
        assert_eq!(
            result.fields.get(&EntityField::TrackingNumber).unwrap(),
            "TRK001"
        );
        assert_eq!(result.records[0]["Status"], "Delivered");
    }

    #[tokio::test]
    async fn test_missing_shipment_is_not_found() {
        let agent = ShippingAgent::new();
        let params = BTreeMap::from([(EntityField::OrderId, "9999".to_string())]);
        let result = agent.query(Operation::ShipmentLookup, &params).await.unwrap();
        assert_eq!(result.status, ResultStatus::NotFound);
        assert!(result.fields.is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_param_is_malformed() {
        let agent = ShippingAgent::new();
        let err = agent
            .query(Operation::ShipmentLookup, &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MalformedParams(_)));
    }
}
