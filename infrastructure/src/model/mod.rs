//! Language model backends: OpenRouter over HTTP, an offline keyword
//! matcher, and the router that falls back from one to the other.

mod heuristic;
mod http;
mod routing;

pub use heuristic::HeuristicModel;
pub use http::{DEFAULT_BASE_URL, DEFAULT_MODELS, HttpLanguageModel, ModelSettings};
pub use routing::RoutedModel;
