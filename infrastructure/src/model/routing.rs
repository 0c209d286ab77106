//! Primary model with an offline fallback.
//!
//! The engine asks for extraction and phrasing through one handle. When an
//! OpenRouter backend is configured it goes first; any failure there drops
//! to the keyword matcher so a dead network never turns into a dead CLI.

use super::{HeuristicModel, HttpLanguageModel, ModelSettings};
use async_trait::async_trait;
use crossdesk_application::ports::language_model::{LanguageModel, ModelError};
use crossdesk_domain::{QueryIntent, StructuredFacts};
use tracing::warn;

pub struct RoutedModel {
    primary: Option<HttpLanguageModel>,
    fallback: HeuristicModel,
}

impl RoutedModel {
    pub fn online(settings: ModelSettings) -> Self {
        Self {
            primary: Some(HttpLanguageModel::new(settings)),
            fallback: HeuristicModel::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            primary: None,
            fallback: HeuristicModel::new(),
        }
    }
}

#[async_trait]
impl LanguageModel for RoutedModel {
    fn name(&self) -> &str {
        match &self.primary {
            Some(primary) => primary.name(),
            None => self.fallback.name(),
        }
    }

    async fn extract_intent(&self, raw_text: &str) -> Result<QueryIntent, ModelError> {
        if let Some(primary) = &self.primary {
            match primary.extract_intent(raw_text).await {
                Ok(intent) => return Ok(intent),
                Err(err) => warn!("extraction via {} failed, falling back: {}", primary.name(), err),
            }
        }
        self.fallback.extract_intent(raw_text).await
    }

    async fn phrase_answer(&self, facts: &StructuredFacts) -> Result<String, ModelError> {
        if let Some(primary) = &self.primary {
            match primary.phrase_answer(facts).await {
                Ok(text) => return Ok(text),
                Err(err) => warn!("phrasing via {} failed, falling back: {}", primary.name(), err),
            }
        }
        self.fallback.phrase_answer(facts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossdesk_domain::AgentRole;
    use std::time::Duration;

    #[tokio::test]
    async fn test_offline_routing_uses_the_heuristic() {
        let model = RoutedModel::offline();
        assert_eq!(model.name(), "heuristic");
        let intent = model.extract_intent("track order 3").await.unwrap();
        assert!(intent.required_agents.contains(&AgentRole::Shipping));
    }

    #[tokio::test]
    async fn test_unreachable_primary_falls_back() {
        // Port 9 (discard) refuses the connection immediately.
        let settings = ModelSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "unused".to_string(),
            models: vec!["test/unreachable".to_string()],
            timeout: Duration::from_millis(200),
            ..ModelSettings::default()
        };
        let model = RoutedModel::online(settings);
        assert_eq!(model.name(), "openrouter");

        let intent = model.extract_intent("track order 3").await.unwrap();
        assert!(intent.required_agents.contains(&AgentRole::Order));
        assert!(intent.required_agents.contains(&AgentRole::Shipping));
    }
}
