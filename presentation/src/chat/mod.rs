//! Interactive chat module
//!
//! Provides a readline-based interactive surface over the query engine.
//! Suspended runs resume inline from the next line of input.

mod repl;

pub use repl::ChatRepl;
