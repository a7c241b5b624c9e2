//! Worker session lifecycle
//!
//! One persistent MCP connection per configured worker, created lazily on
//! first access and cached for the life of the session scope. Sessions are
//! owned by a [`SessionManager`] instance (not process-global state), so
//! independent user sessions never share or race on the same connections.

use super::registry::{ToolDescriptor, WorkerRegistry};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::CallToolRequestParam,
    service::{RoleClient, RunningService},
    transport::TokioChildProcess,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A live, reusable connection to one worker process.
///
/// The trait is the seam between the dispatcher and the transport: the
/// production implementation speaks MCP to a child process, tests substitute
/// in-memory stubs.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Invoke a named operation with a mapping of named arguments.
    async fn call(
        &self,
        operation: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value>;
}

/// MCP session over a child-process stdio transport.
pub struct McpToolSession {
    service: RunningService<RoleClient, ()>,
}

#[async_trait]
impl ToolSession for McpToolSession {
    async fn call(
        &self,
        operation: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: operation.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|e| AppError::Internal(format!("MCP call failed: {}", e)))?;

        // Flatten text contents; workers emit a single JSON text block.
        let text = result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error.unwrap_or(false) {
            return Err(AppError::Internal(if text.is_empty() {
                format!("operation '{}' reported an error", operation)
            } else {
                text
            }));
        }

        Ok(serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::Value::String(text)))
    }
}

/// Launches worker processes and performs the startup handshake.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn launch(&self, descriptor: &ToolDescriptor) -> Result<Arc<dyn ToolSession>>;
}

/// Production factory: spawns the worker as a child process and completes
/// the MCP initialize handshake over its stdio.
pub struct ChildProcessFactory;

#[async_trait]
impl SessionFactory for ChildProcessFactory {
    async fn launch(&self, descriptor: &ToolDescriptor) -> Result<Arc<dyn ToolSession>> {
        let program = descriptor.launch_command();

        let mut command = tokio::process::Command::new(&program);
        command.args(&descriptor.args);

        let transport = TokioChildProcess::new(command).map_err(|e| {
            AppError::Session(format!("failed to spawn '{}': {}", program, e))
        })?;

        let service = ().serve(transport).await.map_err(|e| {
            AppError::Session(format!("handshake with '{}' failed: {}", program, e))
        })?;

        tracing::info!(worker = %descriptor.name, command = %program, "worker session established");

        Ok(Arc::new(McpToolSession { service }))
    }
}

/// Map from worker name to live session handle.
pub type SessionMap = HashMap<String, Arc<dyn ToolSession>>;

/// Owns exactly one persistent connection per configured worker.
///
/// Sessions are created on first call to [`ensure_sessions`] and reused for
/// every subsequent query in this scope. Initialization is guarded against
/// concurrent first-access races: at most one launch per worker per scope.
///
/// [`ensure_sessions`]: SessionManager::ensure_sessions
pub struct SessionManager {
    registry: WorkerRegistry,
    factory: Arc<dyn SessionFactory>,
    sessions: OnceCell<SessionMap>,
}

impl SessionManager {
    pub fn new(registry: WorkerRegistry, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            registry,
            factory,
            sessions: OnceCell::new(),
        }
    }

    /// A manager that launches the registry's workers as child processes.
    pub fn with_child_processes(registry: WorkerRegistry) -> Self {
        Self::new(registry, Arc::new(ChildProcessFactory))
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Idempotent session establishment.
    ///
    /// The first call launches all configured workers; later calls return
    /// the same map (and the same underlying connections) unchanged. A
    /// worker that fails to launch is logged and skipped - the returned map
    /// may hold fewer entries than the registry, and the dispatcher
    /// tolerates the gap. Only total failure (an empty registry, or no
    /// worker launching at all) is an error.
    pub async fn ensure_sessions(&self) -> Result<&SessionMap> {
        if self.registry.is_empty() {
            return Err(AppError::Session("no workers configured".to_string()));
        }

        self.sessions
            .get_or_try_init(|| async {
                let mut map: SessionMap = HashMap::new();

                for descriptor in self.registry.iter() {
                    match self.factory.launch(descriptor).await {
                        Ok(session) => {
                            map.insert(descriptor.name.clone(), session);
                        }
                        Err(e) => {
                            tracing::warn!(worker = %descriptor.name, "failed to launch worker: {}", e);
                        }
                    }
                }

                if map.is_empty() {
                    return Err(AppError::Session(
                        "failed to establish any worker session".to_string(),
                    ));
                }

                Ok(map)
            })
            .await
    }
}
