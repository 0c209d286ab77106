//! ShopCore order store: users and their orders.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    #[serde(rename = "UserID")]
    pub user_id: u32,
    #[serde(rename = "Name")]
    pub name: &'static str,
    #[serde(rename = "Email")]
    pub email: &'static str,
    #[serde(rename = "PremiumStatus")]
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    #[serde(rename = "OrderID")]
    pub order_id: u32,
    #[serde(rename = "UserID")]
    pub user_id: u32,
    #[serde(rename = "Product")]
    pub product: &'static str,
    #[serde(rename = "OrderDate")]
    pub order_date: &'static str,
    #[serde(rename = "Status")]
    pub status: &'static str,
}

/// In-memory ShopCore dataset. Read-only after construction; every lookup
/// is keyed by user or order ID, or the account email.
pub struct OrderStore {
    users: Vec<UserRow>,
    orders: Vec<OrderRow>,
}

impl OrderStore {
    /// The deterministic seed: five accounts, seven orders. Order 1 is
    /// delivered, order 7 is Alice's most recent and still processing.
    pub fn seeded() -> Self {
        let users = vec![
            UserRow { user_id: 1, name: "Alice Johnson", email: "alice@example.com", premium: true },
            UserRow { user_id: 2, name: "Bob Smith", email: "bob@example.com", premium: false },
            UserRow { user_id: 3, name: "Charlie Brown", email: "charlie@example.com", premium: true },
            UserRow { user_id: 4, name: "Diana Prince", email: "diana@example.com", premium: false },
            UserRow { user_id: 5, name: "Eve Wilson", email: "eve@example.com", premium: true },
        ];
        let orders = vec![
            OrderRow { order_id: 1, user_id: 1, product: "Gaming Monitor", order_date: "2025-08-12", status: "Delivered" },
            OrderRow { order_id: 2, user_id: 2, product: "Wireless Headphones", order_date: "2025-08-09", status: "Delivered" },
            OrderRow { order_id: 3, user_id: 3, product: "Gaming Monitor", order_date: "2025-08-14", status: "In Transit" },
            OrderRow { order_id: 4, user_id: 4, product: "Wireless Headphones", order_date: "2025-08-11", status: "Returned" },
            OrderRow { order_id: 5, user_id: 5, product: "Mechanical Keyboard", order_date: "2025-08-16", status: "Processing" },
            OrderRow { order_id: 6, user_id: 1, product: "Gaming Mouse", order_date: "2025-08-13", status: "In Transit" },
            OrderRow { order_id: 7, user_id: 1, product: "USB-C Cable", order_date: "2025-08-19", status: "Processing" },
        ];
        Self { users, orders }
    }

    pub fn user_by_id(&self, user_id: u32) -> Option<&UserRow> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&UserRow> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn order_by_id(&self, order_id: u32) -> Option<&OrderRow> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn orders_for_user(&self, user_id: u32) -> Vec<&OrderRow> {
        self.orders.iter().filter(|o| o.user_id == user_id).collect()
    }

    /// The user's most recent order by order date, order ID breaking ties.
    pub fn latest_order_for_user(&self, user_id: u32) -> Option<&OrderRow> {
        self.orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .max_by_key(|o| (o.order_date, o.order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let store = OrderStore::seeded();
        let user = store.user_by_email("Alice@Example.COM").unwrap();
        assert_eq!(user.user_id, 1);
    }

    #[test]
    fn test_latest_order_picks_most_recent() {
        let store = OrderStore::seeded();
        let latest = store.latest_order_for_user(1).unwrap();
        assert_eq!(latest.order_id, 7);
        assert_eq!(latest.status, "Processing");
    }

    #[test]
    fn test_unknown_ids_yield_none() {
        let store = OrderStore::seeded();
        assert!(store.order_by_id(9999).is_none());
        assert!(store.user_by_email("nobody@example.com").is_none());
        assert!(store.latest_order_for_user(99).is_none());
    }

    #[test]
    fn test_rows_serialize_with_wire_names() {
        let store = OrderStore::seeded();
        let value = serde_json::to_value(store.order_by_id(1).unwrap()).unwrap();
        assert_eq!(value["OrderID"], 1);
        assert_eq!(value["UserID"], 1);
        assert_eq!(value["Status"], "Delivered");
    }
}
