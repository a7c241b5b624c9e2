//! LLM Provider Clients and Abstractions
//!
//! A unified interface for the chat-completion backend. The rest of the
//! application works against the [`LLMClient`] trait; the concrete client
//! speaks to any OpenAI-compatible endpoint (Groq by default, the
//! original deployment target).
//!
//! # Example
//!
//! ```ignore
//! use hatchup::llm::{LLMClient, Provider};
//!
//! let provider = Provider::Groq {
//!     api_key: std::env::var("GROQ_API_KEY")?,
//!     model: "openai/gpt-oss-20b".to_string(),
//! };
//! let client = provider.create_client(0.3)?;
//! let answer = client.generate("What is a TAM?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// OpenAI-compatible chat-completion client.
pub mod openai;

pub use client::{LLMClient, Provider};
pub use openai::OpenAIClient;
