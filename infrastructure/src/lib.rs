//! Infrastructure layer for crossdesk
//!
//! This crate contains adapters that implement the ports defined in the
//! application and domain layers: the seeded stores, the four desk agents,
//! the model backends, session persistence, trace logging, and
//! configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;
pub mod model;
pub mod sessions;
pub mod stores;

// Re-export commonly used types
pub use agents::{OrderAgent, PaymentAgent, ShippingAgent, SupportAgent, seeded_directory};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlTraceLogger;
pub use model::{HeuristicModel, HttpLanguageModel, ModelSettings, RoutedModel};
pub use sessions::{FileSessionStore, MemorySessionStore, SessionStoreError};
pub use stores::{OrderStore, PaymentStore, ShippingStore, SupportStore};
