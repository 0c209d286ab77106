//! Query understanding module
//!
//! The structured form a customer query takes after intent extraction.

pub mod intent;

pub use intent::QueryIntent;
