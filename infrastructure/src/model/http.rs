//! OpenRouter-backed language model.
//!
//! One chat completion per request, walking a fixed model rotation until
//! one answers. The index of the model that answered last is remembered so
//! the next request starts there instead of retrying known-dead entries
//! from the top.

use async_trait::async_trait;
use crossdesk_application::ports::language_model::{LanguageModel, ModelError};
use crossdesk_domain::{AgentRole, EntityField, Operation, QueryIntent, StructuredFacts};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Free-tier rotation used when the config names no models.
pub const DEFAULT_MODELS: [&str; 5] = [
    "xiaomi/mimo-v2-flash:free",
    "mistralai/devstral-2512:free",
    "tngtech/deepseek-r1t2-chimera:free",
    "tngtech/deepseek-r1t-chimera:free",
    "deepseek/deepseek-r1-0528:free",
];

const EXTRACT_PROMPT: &str = "\
You route retail support queries to four desks: order (ShopCore), shipping \
(ShipStream), payment (PayGuard), support (CareDesk).\n\
Reply with JSON only, no prose, shaped like:\n\
{\"agents\": [\"order\", \"payment\"], \"operations\": {\"payment\": \
\"refund_lookup\"}, \"entities\": {\"Email\": \"a@b.com\"}}\n\
Rules:\n\
- agents: every desk the query needs. Include \"order\" whenever another \
desk needs a user or order resolved from an email address.\n\
- operations: only where a desk should run something other than its default \
lookup. The only override is \"refund_lookup\" for payment.\n\
- entities: only values written in the query. Known keys: OrderID, UserID, \
Email, TicketID, PaymentMethodID, TrackingNumber. Never invent values.\n\
\n\
Query: ";

const PHRASE_PROMPT: &str = "\
You are a retail support assistant. Rewrite the findings below as a short, \
friendly answer to the customer. Use only the findings; never add, guess, \
or promise anything they do not contain. Say plainly what was not found or \
not checked.\n\
\n\
Findings:\n";

/// Connection settings for the OpenRouter backend.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub api_key: String,
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            temperature: 0.1,
            max_tokens: 512,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct HttpLanguageModel {
    client: Client,
    base_url: String,
    api_key: String,
    models: Vec<String>,
    /// Rotation position of the model that answered most recently.
    last_good: AtomicUsize,
    temperature: f32,
    max_tokens: u32,
}

impl HttpLanguageModel {
    pub fn new(settings: ModelSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .expect("Failed to create HTTP client");
        let models = if settings.models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            settings.models
        };
        Self {
            client,
            base_url: settings.base_url,
            api_key: settings.api_key,
            models,
            last_good: AtomicUsize::new(0),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    async fn complete_text(&self, prompt: String) -> Result<String, ModelError> {
        let start = self.last_good.load(Ordering::Relaxed);
        let mut attempts = 0;
        for offset in 0..self.models.len() {
            let idx = (start + offset) % self.models.len();
            let model = &self.models[idx];
            attempts += 1;
            match self.request(model, &prompt).await {
                Ok(text) => {
                    self.last_good.store(idx, Ordering::Relaxed);
                    return Ok(text);
                }
                Err(err) => warn!(model = %model, "model request failed: {}", err),
            }
        }
        Err(ModelError::Exhausted { attempts })
    }

    async fn request(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ModelError::RequestFailed(format!(
                "HTTP {} from {}",
                response.status(),
                model
            )));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::InvalidResponse("empty completion".to_string()));
        }
        debug!(model = %model, chars = text.len(), "model answered");
        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn extract_intent(&self, raw_text: &str) -> Result<QueryIntent, ModelError> {
        let reply = self
            .complete_text(format!("{}{}", EXTRACT_PROMPT, raw_text))
            .await?;
        let wire = parse_wire(&reply)?;
        Ok(intent_from_wire(raw_text, wire))
    }

    async fn phrase_answer(&self, facts: &StructuredFacts) -> Result<String, ModelError> {
        let findings = serde_json::to_string_pretty(facts)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        let reply = self
            .complete_text(format!("{}{}", PHRASE_PROMPT, findings))
            .await?;
        Ok(reply.trim().to_string())
    }
}

// ==================== Wire format ====================

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

/// The extraction reply before validation. Unknown agents, operations, and
/// entity keys get dropped rather than failing the whole reply.
#[derive(Debug, Default, Deserialize)]
struct WireIntent {
    #[serde(default)]
    agents: Vec<String>,
    #[serde(default)]
    operations: BTreeMap<String, String>,
    #[serde(default)]
    entities: BTreeMap<String, String>,
}

/// Models often wrap JSON in a markdown fence despite the instructions.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest.trim())
}

fn parse_wire(text: &str) -> Result<WireIntent, ModelError> {
    let body = strip_fences(text);
    match serde_json::from_str(body) {
        Ok(wire) => Ok(wire),
        Err(first) => {
            // Some models insist on prose around the JSON.
            if let (Some(open), Some(close)) = (body.find('{'), body.rfind('}'))
                && open < close
                && let Ok(wire) = serde_json::from_str(&body[open..=close])
            {
                return Ok(wire);
            }
            Err(ModelError::InvalidResponse(first.to_string()))
        }
    }
}

fn intent_from_wire(raw_text: &str, wire: WireIntent) -> QueryIntent {
    let mut intent = QueryIntent::new(raw_text);
    for (key, value) in &wire.entities {
        match EntityField::from_str(key) {
            Ok(field) if !value.trim().is_empty() => {
                intent = intent.with_entity(field, value.trim());
            }
            Ok(_) => {}
            Err(_) => debug!(key = %key, "dropping unknown entity key"),
        }
    }
    for name in &wire.agents {
        match AgentRole::from_str(name) {
            Ok(role) => intent = intent.with_agent(role),
            Err(_) => debug!(agent = %name, "dropping unknown agent"),
        }
    }
    for op_name in wire.operations.values() {
        match Operation::from_str(op_name) {
            Ok(op) => intent = intent.with_operation(op),
            Err(_) => debug!(operation = %op_name, "dropping unknown operation"),
        }
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_stripping() {
        assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_tolerates_surrounding_prose() {
        let wire = parse_wire("Sure! Here you go: {\"agents\": [\"order\"]} Hope that helps.")
            .unwrap();
        assert_eq!(wire.agents, vec!["order"]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_wire("I cannot answer that.").is_err());
    }

    #[test]
    fn test_wire_mapping_drops_unknown_names() {
        let wire = WireIntent {
            agents: vec!["order".to_string(), "warehouse".to_string()],
            operations: BTreeMap::from([("payment".to_string(), "refund_lookup".to_string())]),
            entities: BTreeMap::from([
                ("OrderID".to_string(), "3".to_string()),
                ("Serial".to_string(), "xyz".to_string()),
                ("Email".to_string(), "  ".to_string()),
            ]),
        };
        let intent = intent_from_wire("raw", wire);
        assert!(intent.required_agents.contains(&AgentRole::Order));
        assert!(intent.required_agents.contains(&AgentRole::Payment));
        assert_eq!(intent.required_agents.len(), 2);
        assert_eq!(intent.entities.len(), 1);
        assert_eq!(intent.entities[&EntityField::OrderId], "3");
        assert_eq!(intent.operation_for(AgentRole::Payment), Operation::RefundLookup);
    }

    #[test]
    fn test_default_settings_carry_the_rotation() {
        let settings = ModelSettings::default();
        assert_eq!(settings.models.len(), DEFAULT_MODELS.len());
        assert_eq!(settings.temperature, 0.1);
        assert_eq!(settings.max_tokens, 512);
    }
}
