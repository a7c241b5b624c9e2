//! Concurrent fan-out over worker sessions
//!
//! Given a session map and a user query, the dispatcher issues one call per
//! configured worker, all concurrently, and awaits the full set. Each
//! invocation is wrapped individually: a timeout, transport error, malformed
//! response or missing session becomes a [`ToolCallResult::Failure`] for
//! that worker alone and never aborts the sibling calls.
//!
//! One attempt per worker per query. Retries, if desired, belong to the
//! caller issuing a new query.

use super::registry::WorkerRegistry;
use super::session::SessionMap;
use super::{ResearchBundle, ToolCallResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinSet;

/// Dispatches one research call per registered worker.
pub struct FanOutDispatcher {
    call_timeout: Duration,
}

impl FanOutDispatcher {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    /// Invoke every registered worker's operation concurrently and collect
    /// one [`ToolCallResult`] per worker.
    ///
    /// The returned bundle always holds exactly one entry per registry
    /// entry, and the elapsed time is bounded by the slowest single call,
    /// not the sum of all calls.
    pub async fn dispatch(
        &self,
        registry: &WorkerRegistry,
        sessions: &SessionMap,
        query: &str,
    ) -> ResearchBundle {
        let mut set = JoinSet::new();

        for descriptor in registry.iter() {
            let name = descriptor.name.clone();
            let label = descriptor.label.clone();
            let operation = descriptor.operation.clone();
            let arguments = descriptor.build_arguments(query);
            let session = sessions.get(&name).cloned();
            let timeout = self.call_timeout;

            set.spawn(async move {
                let result = match session {
                    None => ToolCallResult::Failure {
                        tool: label,
                        error: "no live session for this worker".to_string(),
                    },
                    Some(session) => {
                        match tokio::time::timeout(timeout, session.call(&operation, arguments))
                            .await
                        {
                            Err(_) => ToolCallResult::Failure {
                                tool: label,
                                error: format!("timed out after {}s", timeout.as_secs()),
                            },
                            Ok(Err(e)) => ToolCallResult::Failure {
                                tool: label,
                                error: e.to_string(),
                            },
                            Ok(Ok(payload)) => ToolCallResult::Success(payload),
                        }
                    }
                };
                (name, result)
            });
        }

        let mut results: HashMap<String, ToolCallResult> = HashMap::new();
        while let Some(joined) = set.join_next().await {
            if let Ok((name, result)) = joined {
                if let ToolCallResult::Failure { tool, error } = &result {
                    tracing::warn!(worker = %tool, "research call failed: {}", error);
                }
                results.insert(name, result);
            }
        }

        // A cancelled or panicked task still owes the bundle its entry.
        for descriptor in registry.iter() {
            results.entry(descriptor.name.clone()).or_insert_with(|| {
                ToolCallResult::Failure {
                    tool: descriptor.label.clone(),
                    error: "call was aborted before completing".to_string(),
                }
            });
        }

        ResearchBundle::new(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::session::ToolSession;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Session that sleeps, then succeeds or fails.
    struct TimedSession {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl ToolSession for TimedSession {
        async fn call(
            &self,
            operation: &str,
            _arguments: serde_json::Map<String, serde_json::Value>,
        ) -> Result<serde_json::Value> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(AppError::Internal("simulated transport error".to_string()))
            } else {
                Ok(json!({"operation": operation}))
            }
        }
    }

    fn sessions_with(specs: &[(&str, Duration, bool)]) -> SessionMap {
        specs
            .iter()
            .map(|(name, delay, fail)| {
                (
                    name.to_string(),
                    Arc::new(TimedSession {
                        delay: *delay,
                        fail: *fail,
                    }) as Arc<dyn ToolSession>,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_one_failure_leaves_siblings_intact() {
        let registry = WorkerRegistry::builtin();
        let sessions = sessions_with(&[
            ("reddit", Duration::from_millis(0), true),
            ("wikipedia", Duration::from_millis(0), false),
            ("google", Duration::from_millis(0), false),
            ("medium", Duration::from_millis(0), false),
        ]);

        let dispatcher = FanOutDispatcher::new(Duration::from_secs(5));
        let bundle = dispatcher.dispatch(&registry, &sessions, "AI Agents").await;

        assert_eq!(bundle.len(), 4);
        assert_eq!(bundle.failure_count(), 1);
        assert!(bundle.get("reddit").unwrap().is_failure());
        assert!(!bundle.get("wikipedia").unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_missing_session_becomes_failure_entry() {
        let registry = WorkerRegistry::builtin();
        // Only two of the four workers ever launched.
        let sessions = sessions_with(&[
            ("wikipedia", Duration::from_millis(0), false),
            ("google", Duration::from_millis(0), false),
        ]);

        let dispatcher = FanOutDispatcher::new(Duration::from_secs(5));
        let bundle = dispatcher.dispatch(&registry, &sessions, "AI Agents").await;

        assert_eq!(bundle.len(), 4);
        assert_eq!(bundle.failure_count(), 2);
        match bundle.get("reddit").unwrap() {
            ToolCallResult::Failure { tool, error } => {
                assert_eq!(tool, "Reddit");
                assert!(error.contains("no live session"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently_not_serially() {
        let registry = WorkerRegistry::builtin();
        let sessions = sessions_with(&[
            ("reddit", Duration::from_millis(100), false),
            ("wikipedia", Duration::from_millis(100), false),
            ("google", Duration::from_millis(100), true),
            ("medium", Duration::from_millis(100), false),
        ]);

        let dispatcher = FanOutDispatcher::new(Duration::from_secs(5));
        let start = Instant::now();
        let bundle = dispatcher.dispatch(&registry, &sessions, "AI Agents").await;
        let elapsed = start.elapsed();

        assert_eq!(bundle.len(), 4);
        // Bounded by the slowest call, not the sum of all four.
        assert!(
            elapsed < Duration::from_millis(250),
            "dispatch took {:?}, calls appear serialized",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_per_tool_failure() {
        let registry = WorkerRegistry::builtin();
        let sessions = sessions_with(&[
            ("reddit", Duration::from_secs(60), false),
            ("wikipedia", Duration::from_millis(10), false),
            ("google", Duration::from_millis(10), false),
            ("medium", Duration::from_millis(10), false),
        ]);

        let dispatcher = FanOutDispatcher::new(Duration::from_secs(1));
        let bundle = dispatcher.dispatch(&registry, &sessions, "AI Agents").await;

        assert_eq!(bundle.len(), 4);
        assert_eq!(bundle.failure_count(), 1);
        match bundle.get("reddit").unwrap() {
            ToolCallResult::Failure { error, .. } => assert!(error.contains("timed out")),
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }
}
