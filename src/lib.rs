//! # HatchUp - VC Research Assistant
//!
//! HatchUp extracts structured insight from startup pitch decks with an LLM
//! backend and augments analysis with live multi-source web research. Its
//! core is a research orchestration layer that fans a query out to four
//! independent retrieval workers - Reddit, Wikipedia, Google, Medium - each
//! a long-lived MCP subprocess, collects their results under partial-failure
//! tolerance, and merges them into a bounded context for generation.
//!
//! ## Overview
//!
//! HatchUp can be used in two ways:
//!
//! 1. **As a CLI** - Run the `hatchup` binary (`chat`, `research`,
//!    `analyze`, `workers`)
//! 2. **As a library** - Import the orchestration components into your own
//!    Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use hatchup::llm::Provider;
//! use hatchup::research::coordinator::ResearchCoordinator;
//! use hatchup::research::registry::WorkerRegistry;
//! use hatchup::research::session::SessionManager;
//! use hatchup::utils::config::HatchupConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HatchupConfig::load_or_default("hatchup.toml")?;
//!
//!     let provider = Provider::from_config(&config.llm)?;
//!     let llm = provider.create_client(config.llm.temperature)?;
//!
//!     let registry = WorkerRegistry::from_config(&config.research);
//!     let sessions = SessionManager::with_child_processes(registry);
//!     let coordinator = ResearchCoordinator::new(llm, sessions, &config.research);
//!
//!     let answer = coordinator.answer("AI Agents", &[]).await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`research`] - multi-source research orchestration (the core)
//! - [`workers`] - the four retrieval worker MCP servers
//! - [`analysis`] - pitch-deck extraction and memo synthesis
//! - [`llm`] - LLM client implementations
//! - [`cli`] - command-line interface
//! - [`types`] - common types and error handling
//! - [`utils`] - configuration and secret lookup
//!
//! ## Failure model
//!
//! A failing retrieval worker never aborts its siblings: every per-tool
//! error - missing credentials, upstream non-success status, timeout, dead
//! session - is contained at the tool boundary and rendered into the
//! research context as a labeled error segment the generation prompt is
//! instructed to disregard.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Pitch-deck analysis and memo synthesis.
pub mod analysis;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Multi-source research orchestration.
pub mod research;
/// Core types (messages, errors).
pub mod types;
/// Configuration and secret lookup utilities.
pub mod utils;
/// Retrieval worker MCP servers.
pub mod workers;

// Re-export commonly used types
pub use analysis::{ExecutiveSummary, InvestmentMemo, MemoGenerator, PitchDeckData};
pub use llm::{LLMClient, Provider};
pub use research::coordinator::ResearchCoordinator;
pub use research::registry::{ToolDescriptor, WorkerRegistry};
pub use research::session::SessionManager;
pub use research::{ResearchBundle, ToolCallResult};
pub use types::{AppError, Result};
pub use utils::config::HatchupConfig;
