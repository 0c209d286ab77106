//! Aggregation module
//!
//! Collects every agent's contribution into structured facts and renders
//! the deterministic fallback wording.

pub mod answer;

pub use answer::{FactSection, FinalAnswer, StructuredFacts, compose_facts, render_template};
