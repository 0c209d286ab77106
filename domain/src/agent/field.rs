//! Entity fields exchanged between desk agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed key for one piece of customer data.
///
/// Fields travel between plan steps through the execution context: an agent
/// that resolves a `UserID` from an email publishes it, and a later agent
/// that requires a `UserID` reads it back. Using an enum instead of bare
/// strings keeps producers and consumers agreeing on the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityField {
    #[serde(rename = "OrderID")]
    OrderId,
    #[serde(rename = "UserID")]
    UserId,
    Email,
    #[serde(rename = "TicketID")]
    TicketId,
    #[serde(rename = "PaymentMethodID")]
    PaymentMethodId,
    TrackingNumber,
}

impl EntityField {
    /// All known fields, in display order.
    pub const ALL: [EntityField; 6] = [
        EntityField::OrderId,
        EntityField::UserId,
        EntityField::Email,
        EntityField::TicketId,
        EntityField::PaymentMethodId,
        EntityField::TrackingNumber,
    ];

    /// The wire name used in agent parameters and follow-up prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityField::OrderId => "OrderID",
            EntityField::UserId => "UserID",
            EntityField::Email => "Email",
            EntityField::TicketId => "TicketID",
            EntityField::PaymentMethodId => "PaymentMethodID",
            EntityField::TrackingNumber => "TrackingNumber",
        }
    }

    /// How the field reads in a sentence addressed to the customer.
    pub fn describe(&self) -> &'static str {
        match self {
            EntityField::OrderId => "order number",
            EntityField::UserId => "user ID",
            EntityField::Email => "email address on the account",
            EntityField::TicketId => "ticket number",
            EntityField::PaymentMethodId => "payment method ID",
            EntityField::TrackingNumber => "tracking number",
        }
    }

    /// True for fields that identify the account rather than a single record.
    pub fn is_account_identifier(&self) -> bool {
        matches!(self, EntityField::UserId | EntityField::Email)
    }
}

impl fmt::Display for EntityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orderid" | "order_id" | "order" => Ok(EntityField::OrderId),
            "userid" | "user_id" | "user" => Ok(EntityField::UserId),
            "email" => Ok(EntityField::Email),
            "ticketid" | "ticket_id" | "ticket" => Ok(EntityField::TicketId),
            "paymentmethodid" | "payment_method_id" | "paymentmethod" => {
                Ok(EntityField::PaymentMethodId)
            }
            "trackingnumber" | "tracking_number" | "tracking" => Ok(EntityField::TrackingNumber),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}
