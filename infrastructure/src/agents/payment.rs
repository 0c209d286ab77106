//! Payment desk agent backed by the PayGuard store.

use crate::agents::{parse_id, record};
use crate::stores::PaymentStore;
use async_trait::async_trait;
use crossdesk_application::ports::domain_agent::{AgentError, DomainAgent};
use crossdesk_domain::{AgentResult, AgentRole, EntityField, Operation};
use std::collections::BTreeMap;

/// Answers wallet and refund questions.
///
/// Both operations resolve the account's wallet first; transactions and
/// payment methods are keyed by wallet, not by user. A refund check also
/// verifies the named payment method belongs to that wallet before any
/// rows are reported.
pub struct PaymentAgent {
    store: PaymentStore,
}

impl PaymentAgent {
    pub fn new() -> Self {
        Self {
            store: PaymentStore::seeded(),
        }
    }

    fn payment_lookup(&self, operation: Operation, user_id: u32) -> AgentResult {
        let Some(wallet) = self.store.wallet_for_user(user_id) else {
            return AgentResult::not_found(
                AgentRole::Payment,
                operation,
                format!("no wallet for user {}", user_id),
            );
        };
        let transactions = self.store.transactions_for_wallet(wallet.wallet_id);
        let mut records = vec![record(wallet)];
        records.extend(transactions.iter().map(|t| record(*t)));
        AgentResult::found(AgentRole::Payment, operation)
            .with_records(records)
            .with_note(format!("{} transactions on the wallet", transactions.len()))
    }

    fn refund_lookup(&self, operation: Operation, user_id: u32, method_id: u32) -> AgentResult {
        let Some(wallet) = self.store.wallet_for_user(user_id) else {
            return AgentResult::not_found(
                AgentRole::Payment,
                operation,
                format!("no wallet for user {}", user_id),
            );
        };
        let Some(method) = self.store.method_by_id(method_id) else {
            return AgentResult::not_found(
                AgentRole::Payment,
                operation,
                format!("payment method {} is not on file", method_id),
            );
        };
        if method.wallet_id != wallet.wallet_id {
            return AgentResult::not_found(
                AgentRole::Payment,
                operation,
                format!("payment method {} does not belong to this account", method_id),
            );
        }

        let refunds = self.store.refunds_for_wallet(wallet.wallet_id);
        if refunds.is_empty() {
            return AgentResult::not_found(
                AgentRole::Payment,
                operation,
                "no refund transactions for this account",
            );
        }
        AgentResult::found(AgentRole::Payment, operation)
            .with_records(refunds.iter().map(|t| record(*t)).collect())
            .with_note(format!("refunded via {}", method.provider))
    }
}

impl Default for PaymentAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainAgent for PaymentAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Payment
    }

    async fn query(
        &self,
        operation: Operation,
        params: &BTreeMap<EntityField, String>,
    ) -> Result<AgentResult, AgentError> {
        let Some(raw_user) = params.get(&EntityField::UserId) else {
            return Err(AgentError::MalformedParams(
                "payment lookup needs a user ID".to_string(),
            ));
        };
        let user_id = parse_id(EntityField::UserId, raw_user)?;

        match operation {
            Operation::RefundLookup => {
                let Some(raw_method) = params.get(&EntityField::PaymentMethodId) else {
                    return Err(AgentError::MalformedParams(
                        "refund lookup needs a payment method ID".to_string(),
                    ));
                };
                let method_id = parse_id(EntityField::PaymentMethodId, raw_method)?;
                Ok(self.refund_lookup(operation, user_id, method_id))
            }
            _ => Ok(self.payment_lookup(operation, user_id)),
        }
    }
}
