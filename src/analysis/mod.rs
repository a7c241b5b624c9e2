//! Pitch-Deck Analysis and Memo Synthesis
//!
//! Three sequential LLM extraction steps turn raw deck text into structured
//! artifacts: deck text → [`models::PitchDeckData`] → an
//! [`models::InvestmentMemo`] → an [`models::ExecutiveSummary`]. Each step
//! is a single schema-guided prompt and a single structured-output parse -
//! no branching state, no concurrency.

/// Memo generation pipeline.
pub mod memo;
/// Structured analysis artifacts.
pub mod models;

pub use memo::MemoGenerator;
pub use models::{ExecutiveSummary, InvestmentMemo, PitchDeckData};
