//! CareDesk support ticket store.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TicketRow {
    #[serde(rename = "TicketID")]
    pub ticket_id: u32,
    #[serde(rename = "UserID")]
    pub user_id: u32,
    /// The order the ticket is about, when it is about one.
    #[serde(rename = "ReferenceID")]
    pub reference_id: u32,
    #[serde(rename = "IssueType")]
    pub issue_type: &'static str,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "CreatedDate")]
    pub created_date: &'static str,
}

impl TicketRow {
    pub fn is_open(&self) -> bool {
        self.status == "Open"
    }
}

pub struct SupportStore {
    tickets: Vec<TicketRow>,
}

impl SupportStore {
    /// One ticket per account. Alice's delivery complaint is closed, so an
    /// open-ticket query for her account comes back empty.
    pub fn seeded() -> Self {
        let tickets = vec![
            TicketRow { ticket_id: 1, user_id: 1, reference_id: 1, issue_type: "Delivery Issue", status: "Closed", created_date: "2025-08-05" },
            TicketRow { ticket_id: 2, user_id: 2, reference_id: 2, issue_type: "Product Quality", status: "Open", created_date: "2025-08-16" },
            TicketRow { ticket_id: 3, user_id: 3, reference_id: 3, issue_type: "Delivery Issue", status: "Open", created_date: "2025-08-16" },
            TicketRow { ticket_id: 4, user_id: 4, reference_id: 4, issue_type: "Refund Request", status: "Closed", created_date: "2025-08-11" },
            TicketRow { ticket_id: 5, user_id: 5, reference_id: 5, issue_type: "Payment Issue", status: "Open", created_date: "2025-08-17" },
        ];
        Self { tickets }
    }

    pub fn ticket_by_id(&self, ticket_id: u32) -> Option<&TicketRow> {
        self.tickets.iter().find(|t| t.ticket_id == ticket_id)
    }

    pub fn open_tickets_for_user(&self, user_id: u32) -> Vec<&TicketRow> {
        self.tickets
            .iter()
            .filter(|t| t.user_id == user_id && t.is_open())
            .collect()
    }

    pub fn tickets_for_user(&self, user_id: u32) -> Vec<&TicketRow> {
        self.tickets.iter().filter(|t| t.user_id == user_id).collect()
    }

    pub fn tickets_referencing_order(&self, order_id: u32) -> Vec<&TicketRow> {
        self.tickets
            .iter()
            .filter(|t| t.reference_id == order_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alice_has_no_open_tickets() {
        let store = SupportStore::seeded();
        assert!(store.open_tickets_for_user(1).is_empty());
        assert_eq!(store.tickets_for_user(1).len(), 1);
    }

    #[test]
    fn test_open_ticket_filter() {
        let store = SupportStore::seeded();
        let open = store.open_tickets_for_user(2);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].ticket_id, 2);
    }

    #[test]
    fn test_order_reference_lookup() {
        let store = SupportStore::seeded();
        assert_eq!(store.tickets_referencing_order(1).len(), 1);
        assert!(store.tickets_referencing_order(7).is_empty());
    }
}
