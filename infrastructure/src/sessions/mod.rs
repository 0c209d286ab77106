//! Suspended session persistence.
//!
//! Two backends behind the same repository trait: an in-process map for
//! chat mode and tests, and a directory of JSON files so a session handed
//! out by one CLI invocation can be resumed by the next.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use thiserror::Error;

/// Errors from the session backends.
#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid session ID: {0}")]
    InvalidId(String),

    #[error("Session store lock poisoned")]
    Poisoned,
}
