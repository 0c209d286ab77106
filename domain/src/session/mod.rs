//! Suspended session domain.
//!
//! - [`snapshot::SessionSnapshot`]: the resumable state of a blocked query
//! - [`snapshot::SessionId`]: the handle given to the customer
//! - [`repository::SessionRepository`]: trait for snapshot persistence

pub mod repository;
pub mod snapshot;

pub use repository::SessionRepository;
pub use snapshot::{SessionId, SessionSnapshot};
