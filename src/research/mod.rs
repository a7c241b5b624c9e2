//! Multi-Source Research Orchestration
//!
//! This module is the core of HatchUp: it fans a user query out to several
//! independent retrieval workers (each a long-lived MCP subprocess), collects
//! their results under partial-failure tolerance, and merges them into a
//! bounded context string for the downstream generation step.
//!
//! # Architecture
//!
//! - [`registry::WorkerRegistry`] - declarative description of the workers
//! - [`session::SessionManager`] - one persistent connection per worker,
//!   created lazily and reused for the life of the session
//! - [`dispatcher::FanOutDispatcher`] - concurrent per-tool calls with
//!   per-call isolation and timeout
//! - [`compactor::ContextCompactor`] - deterministic bundle-to-string
//!   rendering with per-source truncation
//! - [`coordinator::ResearchCoordinator`] - ties the pipeline to the LLM
//!
//! # Data flow
//!
//! query → SessionManager (ensure connections live) → FanOutDispatcher
//! (parallel calls) → [`ResearchBundle`] → ContextCompactor → bounded
//! context string → generation.
//!
//! A failing worker never aborts its siblings: every invocation settles as a
//! [`ToolCallResult`], success or failure, and the bundle always carries one
//! entry per configured worker.

/// Deterministic bundle-to-context rendering.
pub mod compactor;
/// Research pipeline orchestration and chat answer generation.
pub mod coordinator;
/// Concurrent fan-out over worker sessions.
pub mod dispatcher;
/// Worker process registry.
pub mod registry;
/// Worker session lifecycle and caching.
pub mod session;

use std::collections::HashMap;

/// Outcome of one dispatched worker call. Produced exactly once per call;
/// never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCallResult {
    /// Structured payload returned by the worker.
    Success(serde_json::Value),
    /// The call failed at the transport boundary (timeout, dead session,
    /// unreachable worker). Carries the worker's display label.
    Failure { tool: String, error: String },
}

impl ToolCallResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolCallResult::Failure { .. })
    }
}

/// Per-query collection of one result-or-error per configured worker.
/// Immutable once constructed; consumed by the compactor.
#[derive(Debug, Clone, Default)]
pub struct ResearchBundle {
    results: HashMap<String, ToolCallResult>,
}

impl ResearchBundle {
    pub fn new(results: HashMap<String, ToolCallResult>) -> Self {
        Self { results }
    }

    /// Result for a worker, by registry name.
    pub fn get(&self, name: &str) -> Option<&ToolCallResult> {
        self.results.get(name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of entries that settled as failures.
    pub fn failure_count(&self) -> usize {
        self.results.values().filter(|r| r.is_failure()).count()
    }
}
