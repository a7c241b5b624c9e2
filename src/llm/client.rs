//! LLM client abstractions and provider selection

use crate::types::{AppError, Result};
use crate::utils::config::LlmConfig;
use crate::utils::secrets::SecretStore;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All providers implement this trait, allowing the orchestration and
/// analysis layers to stay independent of the concrete backend.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Stream a completion with a system prompt
    async fn stream_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// Both variants speak the OpenAI chat-completion wire format; they differ
/// only in endpoint and defaults.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Groq's OpenAI-compatible API (the default deployment target).
    Groq { api_key: String, model: String },

    /// Any other OpenAI-compatible endpoint (OpenAI itself, OpenRouter,
    /// a local gateway, ...).
    OpenAICompatible {
        api_key: String,
        api_base: String,
        model: String,
    },
}

/// Groq's OpenAI-compatible base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

impl Provider {
    /// Build a provider from configuration, resolving the API key through
    /// the layered secret lookup.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let secrets = SecretStore::from_default_locations();
        let api_key = secrets
            .require(&config.api_key_env)
            .map_err(AppError::Config)?;

        if config.api_base == GROQ_API_BASE {
            Ok(Provider::Groq {
                api_key,
                model: config.model.clone(),
            })
        } else {
            Ok(Provider::OpenAICompatible {
                api_key,
                api_base: config.api_base.clone(),
                model: config.model.clone(),
            })
        }
    }

    /// Create a client instance for this provider
    pub fn create_client(&self, temperature: f32) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Groq { api_key, model } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                GROQ_API_BASE.to_string(),
                model.clone(),
                temperature,
            ))),
            Provider::OpenAICompatible {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                temperature,
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq { .. } => "Groq",
            Provider::OpenAICompatible { .. } => "OpenAI-compatible",
        }
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        match self {
            Provider::Groq { model, .. } => model,
            Provider::OpenAICompatible { model, .. } => model,
        }
    }
}
