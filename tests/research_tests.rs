//! Integration tests for the research orchestration pipeline
//!
//! Drives the session manager, dispatcher, and compactor together through
//! the public API, with stubbed worker sessions standing in for the real
//! MCP subprocesses.

use async_trait::async_trait;
use hatchup::research::compactor::ContextCompactor;
use hatchup::research::dispatcher::FanOutDispatcher;
use hatchup::research::registry::{ToolDescriptor, WorkerRegistry};
use hatchup::research::session::{SessionFactory, SessionManager, ToolSession};
use hatchup::types::{AppError, Result};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Session that either answers with a fixed payload or fails at transport
/// level.
struct ScriptedSession {
    payload: Option<serde_json::Value>,
}

#[async_trait]
impl ToolSession for ScriptedSession {
    async fn call(
        &self,
        _operation: &str,
        _arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value> {
        match &self.payload {
            Some(payload) => Ok(payload.clone()),
            None => Err(AppError::Internal("simulated transport error".to_string())),
        }
    }
}

/// Factory producing scripted sessions; workers in `failing` error on every
/// call, everyone else succeeds with one record.
struct ScriptedFactory {
    failing: HashSet<String>,
    launches: AtomicUsize,
}

impl ScriptedFactory {
    fn failing_calls_for(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            launches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    async fn launch(&self, descriptor: &ToolDescriptor) -> Result<Arc<dyn ToolSession>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let payload = if self.failing.contains(&descriptor.name) {
            None
        } else {
            Some(json!([{
                "title": format!("{} result", descriptor.label),
                "link": "https://example.com"
            }]))
        };
        Ok(Arc::new(ScriptedSession { payload }))
    }
}

/// "AI Agents" dispatched against four workers where the
/// community-discussion and article-search workers fail and the
/// encyclopedic and web-search workers succeed with one record each. The
/// compacted context must carry exactly two labeled error segments and two
/// populated data segments, all four present.
#[tokio::test]
async fn end_to_end_two_failures_two_successes() {
    let registry = WorkerRegistry::builtin();
    let factory = Arc::new(ScriptedFactory::failing_calls_for(&["reddit", "medium"]));
    let manager = SessionManager::new(registry.clone(), factory);

    let sessions = manager.ensure_sessions().await.unwrap();
    let dispatcher = FanOutDispatcher::new(Duration::from_secs(5));
    let bundle = dispatcher.dispatch(&registry, sessions, "AI Agents").await;

    assert_eq!(bundle.len(), 4);
    assert_eq!(bundle.failure_count(), 2);

    let context = ContextCompactor::new(2000).compact(&registry, &bundle);

    // All four sources present, each exactly once.
    for label in ["Reddit", "Wikipedia", "Google", "Medium"] {
        assert_eq!(
            context.matches(&format!("[{}]:", label)).count(),
            1,
            "missing or duplicated segment for {}",
            label
        );
    }

    // Exactly two labeled error segments...
    assert_eq!(context.matches("MCP Error").count(), 2);
    assert!(context.contains("[Reddit]: [Reddit MCP Error:"));
    assert!(context.contains("[Medium]: [Medium MCP Error:"));

    // ...and two populated data segments.
    assert!(context.contains("Wikipedia result"));
    assert!(context.contains("Google result"));
}

/// Sessions established once are reused by later queries: a second dispatch
/// must not launch any new worker processes.
#[tokio::test]
async fn sessions_are_reused_across_queries() {
    let registry = WorkerRegistry::builtin();
    let factory = Arc::new(ScriptedFactory::failing_calls_for(&[]));
    let manager = SessionManager::new(registry.clone(), factory.clone());

    let dispatcher = FanOutDispatcher::new(Duration::from_secs(5));

    let sessions = manager.ensure_sessions().await.unwrap();
    let first = dispatcher.dispatch(&registry, sessions, "AI Agents").await;

    let sessions = manager.ensure_sessions().await.unwrap();
    let second = dispatcher.dispatch(&registry, sessions, "EV batteries").await;

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 4);
    assert_eq!(factory.launches.load(Ordering::SeqCst), 4);
}

/// The bundle is complete even when every single call fails; the rendered
/// context still names every source.
#[tokio::test]
async fn all_failures_still_produce_full_context() {
    let registry = WorkerRegistry::builtin();
    let factory = Arc::new(ScriptedFactory::failing_calls_for(&[
        "reddit",
        "wikipedia",
        "google",
        "medium",
    ]));
    let manager = SessionManager::new(registry.clone(), factory);

    let sessions = manager.ensure_sessions().await.unwrap();
    let bundle = FanOutDispatcher::new(Duration::from_secs(5))
        .dispatch(&registry, sessions, "AI Agents")
        .await;

    assert_eq!(bundle.failure_count(), 4);

    let context = ContextCompactor::new(2000).compact(&registry, &bundle);
    assert_eq!(context.matches("MCP Error").count(), 4);
}
