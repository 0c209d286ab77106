//! Seeded in-memory datasets, one per desk.
//!
//! Each store is owned by exactly one agent; nothing else reads it. The
//! seed is deterministic so the end-to-end scenarios are reproducible.

mod orders;
mod payments;
mod shipping;
mod support;

pub use orders::{OrderRow, OrderStore, UserRow};
pub use payments::{PaymentMethodRow, PaymentStore, TransactionRow, WalletRow};
pub use shipping::{ShipmentRow, ShippingStore};
pub use support::{SupportStore, TicketRow};
