//! PayGuard payment store: wallets, transactions, payment methods.
//!
//! Transactions and payment methods hang off the wallet, not the user;
//! user-level queries resolve the wallet first.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct WalletRow {
    #[serde(rename = "WalletID")]
    pub wallet_id: u32,
    #[serde(rename = "UserID")]
    pub user_id: u32,
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "Currency")]
    pub currency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    #[serde(rename = "TransactionID")]
    pub transaction_id: u32,
    #[serde(rename = "WalletID")]
    pub wallet_id: u32,
    #[serde(rename = "OrderID")]
    pub order_id: u32,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Type")]
    pub kind: &'static str,
    #[serde(rename = "Timestamp")]
    pub timestamp: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodRow {
    #[serde(rename = "MethodID")]
    pub method_id: u32,
    #[serde(rename = "WalletID")]
    pub wallet_id: u32,
    #[serde(rename = "Provider")]
    pub provider: &'static str,
    #[serde(rename = "ExpiryDate", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<&'static str>,
}

pub struct PaymentStore {
    wallets: Vec<WalletRow>,
    transactions: Vec<TransactionRow>,
    methods: Vec<PaymentMethodRow>,
}

impl PaymentStore {
    /// One wallet per account. The single refund row belongs to Diana's
    /// returned headphones order.
    pub fn seeded() -> Self {
        let wallets = vec![
            WalletRow { wallet_id: 1, user_id: 1, balance: 500.00, currency: "USD" },
            WalletRow { wallet_id: 2, user_id: 2, balance: 250.00, currency: "USD" },
            WalletRow { wallet_id: 3, user_id: 3, balance: 750.00, currency: "USD" },
            WalletRow { wallet_id: 4, user_id: 4, balance: 100.00, currency: "USD" },
            WalletRow { wallet_id: 5, user_id: 5, balance: 1000.00, currency: "USD" },
        ];
        let transactions = vec![
            TransactionRow { transaction_id: 1, wallet_id: 1, order_id: 1, amount: 299.99, kind: "Purchase", timestamp: "2025-08-12" },
            TransactionRow { transaction_id: 2, wallet_id: 2, order_id: 2, amount: 149.99, kind: "Purchase", timestamp: "2025-08-09" },
            TransactionRow { transaction_id: 3, wallet_id: 3, order_id: 3, amount: 299.99, kind: "Purchase", timestamp: "2025-08-14" },
            TransactionRow { transaction_id: 4, wallet_id: 4, order_id: 4, amount: 149.99, kind: "Purchase", timestamp: "2025-08-11" },
            TransactionRow { transaction_id: 5, wallet_id: 4, order_id: 4, amount: 149.99, kind: "Refund", timestamp: "2025-08-13" },
            TransactionRow { transaction_id: 6, wallet_id: 5, order_id: 5, amount: 89.99, kind: "Purchase", timestamp: "2025-08-16" },
            TransactionRow { transaction_id: 7, wallet_id: 1, order_id: 6, amount: 59.99, kind: "Purchase", timestamp: "2025-08-13" },
            TransactionRow { transaction_id: 8, wallet_id: 1, order_id: 7, amount: 19.99, kind: "Purchase", timestamp: "2025-08-19" },
        ];
        let methods = vec![
            PaymentMethodRow { method_id: 1, wallet_id: 1, provider: "Credit Card", expiry_date: Some("2025-12-31") },
            PaymentMethodRow { method_id: 2, wallet_id: 2, provider: "Debit Card", expiry_date: Some("2025-11-30") },
            PaymentMethodRow { method_id: 3, wallet_id: 3, provider: "PayPal", expiry_date: None },
            PaymentMethodRow { method_id: 4, wallet_id: 4, provider: "Credit Card", expiry_date: Some("2025-10-31") },
            PaymentMethodRow { method_id: 5, wallet_id: 5, provider: "Bank Transfer", expiry_date: None },
            PaymentMethodRow { method_id: 21, wallet_id: 1, provider: "PayPal", expiry_date: None },
            PaymentMethodRow { method_id: 24, wallet_id: 4, provider: "PayPal", expiry_date: None },
        ];
        Self {
            wallets,
            transactions,
            methods,
        }
    }

    pub fn wallet_for_user(&self, user_id: u32) -> Option<&WalletRow> {
        self.wallets.iter().find(|w| w.user_id == user_id)
    }

    pub fn transactions_for_wallet(&self, wallet_id: u32) -> Vec<&TransactionRow> {
        self.transactions
            .iter()
            .filter(|t| t.wallet_id == wallet_id)
            .collect()
    }

    pub fn refunds_for_wallet(&self, wallet_id: u32) -> Vec<&TransactionRow> {
        self.transactions
            .iter()
            .filter(|t| t.wallet_id == wallet_id && t.kind == "Refund")
            .collect()
    }

    pub fn method_by_id(&self, method_id: u32) -> Option<&PaymentMethodRow> {
        self.methods.iter().find(|m| m.method_id == method_id)
    }

    pub fn methods_for_wallet(&self, wallet_id: u32) -> Vec<&PaymentMethodRow> {
        self.methods
            .iter()
            .filter(|m| m.wallet_id == wallet_id)
            .collect()
    }
}
