//! Presentation layer for crossdesk
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporting, follow-up reply parsing, and the interactive chat surface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;
pub mod prompt;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use output::{AnswerFormatter, ConsoleFormatter, disable_colors};
pub use progress::ConsoleProgress;
pub use prompt::parse_reply;
