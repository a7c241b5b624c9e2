//! TOML-based configuration for HatchUp
//!
//! This module provides declarative configuration for the LLM provider and
//! the research orchestration layer via a TOML file (`hatchup.toml`). The
//! file is optional: every section has working defaults, so the binary runs
//! with no configuration at all (credentials permitting).

use crate::research::registry::ToolDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from hatchup.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatchupConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchConfig,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Environment variable name containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-oss-20b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Upper bound on each worker invocation, in seconds.
    ///
    /// Expiry is treated identically to any other per-tool failure.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Per-source character budget in the compacted context.
    #[serde(default = "default_char_budget")]
    pub char_budget: usize,

    /// Number of recent conversation turns included in the chat prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Worker registry entries. Empty means "use the built-in registry"
    /// (the four sibling worker binaries).
    #[serde(default)]
    pub workers: Vec<ToolDescriptor>,
}

fn default_call_timeout_secs() -> u64 {
    20
}

fn default_char_budget() -> usize {
    2000
}

fn default_history_window() -> usize {
    5
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            char_budget: default_char_budget(),
            history_window: default_history_window(),
            workers: Vec::new(),
        }
    }
}

// ============= Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl HatchupConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: HatchupConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.research.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.call_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.research.char_budget == 0 {
            return Err(ConfigError::ValidationError(
                "research.char_budget must be greater than zero".to_string(),
            ));
        }

        // Worker names must be unique across the registry
        let mut seen = HashSet::new();
        for worker in &self.research.workers {
            if !seen.insert(worker.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate worker name in [[research.workers]]: {}",
                    worker.name
                )));
            }
        }

        Ok(())
    }

    /// Get the LLM API key from the environment
    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.llm.api_key_env)
            .map_err(|_| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }
}
