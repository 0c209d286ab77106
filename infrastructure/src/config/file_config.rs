//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use crate::model::{DEFAULT_BASE_URL, ModelSettings};
use crossdesk_application::ExecutionParams;
use crossdesk_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("model.timeout_secs cannot be 0")]
    InvalidModelTimeout,

    #[error("engine.agent_timeout_ms cannot be 0")]
    InvalidAgentTimeout,

    #[error("model name cannot be empty")]
    EmptyModelName,
}

/// Raw model backend configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model rotation, tried in order. Empty means the built-in rotation.
    pub models: Vec<String>,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Timeout in seconds for one HTTP request
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 30,
            temperature: 0.1,
            max_tokens: 512,
        }
    }
}

impl FileModelConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Builds connection settings with the key injected by the caller.
    pub fn settings(&self, api_key: String) -> ModelSettings {
        ModelSettings {
            base_url: self.base_url.clone(),
            api_key,
            models: self.models.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Raw engine configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Timeout in milliseconds for one agent lookup
    pub agent_timeout_ms: u64,
    /// Extra extraction attempts after a transient failure
    pub extract_retries: usize,
    /// Extra phrasing attempts before the template takes over
    pub phrase_retries: usize,
    /// Directory for suspended session files; the user data directory
    /// when unset
    pub session_dir: Option<String>,
    /// JSONL trace log path; tracing disabled when unset
    pub trace_log: Option<String>,
}

impl FileEngineConfig {
    /// Where suspended sessions are persisted.
    ///
    /// Sessions must outlive the process for --resume to work, so the
    /// unset case falls back to the platform data directory. `None` only
    /// on platforms without one; callers then fall back to memory.
    pub fn session_path(&self) -> Option<PathBuf> {
        match &self.session_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => dirs::data_dir().map(|p| p.join("crossdesk").join("sessions")),
        }
    }
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            agent_timeout_ms: 5000,
            extract_retries: 1,
            phrase_retries: 2,
            session_dir: None,
            trace_log: None,
        }
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Complete configuration loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: FileModelConfig,
    pub engine: FileEngineConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration after loading
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.model.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidModelTimeout);
        }
        if self.engine.agent_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidAgentTimeout);
        }
        if self.model.models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyModelName);
        }
        Ok(())
    }

    /// Driver parameters assembled from the model and engine sections.
    pub fn params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_model_timeout(Duration::from_secs(self.model.timeout_secs))
            .with_agent_timeout(Duration::from_millis(self.engine.agent_timeout_ms))
            .with_extract_retries(self.engine.extract_retries)
            .with_phrase_retries(self.engine.phrase_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert!(config.model.models.is_empty());
        assert_eq!(config.model.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.engine.agent_timeout_ms, 5000);
        assert!(config.engine.session_dir.is_none());
        assert!(config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = FileConfig::default();
        config.model.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidModelTimeout)
        ));

        let mut config = FileConfig::default();
        config.engine.agent_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidAgentTimeout)
        ));
    }

    #[test]
    fn test_validate_rejects_blank_model_names() {
        let mut config = FileConfig::default();
        config.model.models = vec!["tngtech/deepseek-r1t2-chimera:free".to_string(), " ".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName)
        ));
    }

    #[test]
    fn test_params_mapping() {
        let mut config = FileConfig::default();
        config.model.timeout_secs = 10;
        config.engine.agent_timeout_ms = 750;
        config.engine.extract_retries = 3;

        let params = config.params();
        assert_eq!(params.model_timeout, Duration::from_secs(10));
        assert_eq!(params.agent_timeout, Duration::from_millis(750));
        assert_eq!(params.extract_retries, 3);
        assert_eq!(params.phrase_retries, 2);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [model]
            models = ["deepseek/deepseek-r1-0528:free"]

            [engine]
            agent_timeout_ms = 2000
            session_dir = "/tmp/crossdesk-sessions"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.models.len(), 1);
        assert_eq!(config.model.timeout_secs, 30);
        assert_eq!(config.engine.agent_timeout_ms, 2000);
        assert_eq!(
            config.engine.session_dir.as_deref(),
            Some("/tmp/crossdesk-sessions")
        );
        assert_eq!(config.engine.phrase_retries, 2);
    }

    #[test]
    fn test_settings_carry_config_values() {
        let mut config = FileModelConfig::default();
        config.temperature = 0.4;
        config.timeout_secs = 12;

        let settings = config.settings("sk-test".to_string());
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.temperature, 0.4);
        assert_eq!(settings.timeout, Duration::from_secs(12));
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }
}
