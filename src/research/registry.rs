//! Worker process registry
//!
//! A declarative, ordered description of the retrieval workers. Each entry
//! names one worker, the command that launches it, the MCP operation the
//! dispatcher invokes, and the shape of that call (static arguments plus an
//! optional parameter the user query is bound to).
//!
//! Registry order is load-bearing: the compactor renders sources in this
//! order, independent of any map iteration order downstream.

use crate::utils::config::ResearchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declarative description of one retrieval worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique registry key, e.g. `reddit`.
    pub name: String,

    /// Display label used in the compacted context, e.g. `Reddit`.
    pub label: String,

    /// Launch command. When absent, the sibling binary
    /// `hatchup-mcp-<name>` next to the current executable is used.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to the launch command.
    #[serde(default)]
    pub args: Vec<String>,

    /// MCP operation the dispatcher invokes on this worker.
    pub operation: String,

    /// Arguments sent on every call, regardless of the query.
    #[serde(default)]
    pub static_args: serde_json::Map<String, serde_json::Value>,

    /// Name of the parameter the raw user query is bound to. Absent for
    /// workers called with a fixed argument shape only.
    #[serde(default)]
    pub query_param: Option<String>,
}

impl ToolDescriptor {
    /// The command that launches this worker.
    ///
    /// An explicit `command` is used as given. Otherwise the conventional
    /// sibling binary is resolved next to the current executable, falling
    /// back to a bare name looked up on `PATH`.
    pub fn launch_command(&self) -> String {
        if let Some(command) = &self.command {
            return command.clone();
        }

        let bin_name = format!("hatchup-mcp-{}", self.name);
        sibling_path(&bin_name)
            .map(|p| p.display().to_string())
            .unwrap_or(bin_name)
    }

    /// Arguments for one invocation: the static arguments, plus the user
    /// query bound to `query_param` when configured.
    pub fn build_arguments(&self, query: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut args = self.static_args.clone();
        if let Some(param) = &self.query_param {
            args.insert(
                param.clone(),
                serde_json::Value::String(query.to_string()),
            );
        }
        args
    }
}

/// Resolve a binary next to the current executable, if it exists there.
fn sibling_path(bin_name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(bin_name);
    candidate.exists().then_some(candidate)
}

/// Ordered collection of worker descriptors with unique names.
#[derive(Debug, Clone)]
pub struct WorkerRegistry {
    tools: Vec<ToolDescriptor>,
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WorkerRegistry {
    /// A registry from an explicit, ordered list of descriptors.
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// The built-in registry: the four sibling worker binaries, in the
    /// order the compacted context presents them.
    pub fn builtin() -> Self {
        let mut reddit_args = serde_json::Map::new();
        // Fixed community and a small cap to bound payload size.
        reddit_args.insert("subreddit".into(), "startups".into());
        reddit_args.insert("limit".into(), 1.into());

        Self {
            tools: vec![
                ToolDescriptor {
                    name: "reddit".into(),
                    label: "Reddit".into(),
                    command: None,
                    args: Vec::new(),
                    operation: "fetch_reddit_posts_with_comments".into(),
                    static_args: reddit_args,
                    query_param: None,
                },
                ToolDescriptor {
                    name: "wikipedia".into(),
                    label: "Wikipedia".into(),
                    command: None,
                    args: Vec::new(),
                    operation: "search".into(),
                    static_args: serde_json::Map::new(),
                    query_param: Some("query".into()),
                },
                ToolDescriptor {
                    name: "google".into(),
                    label: "Google".into(),
                    command: None,
                    args: Vec::new(),
                    operation: "google_search".into(),
                    static_args: serde_json::Map::new(),
                    query_param: Some("query".into()),
                },
                ToolDescriptor {
                    name: "medium".into(),
                    label: "Medium".into(),
                    command: None,
                    args: Vec::new(),
                    operation: "search_medium".into(),
                    static_args: serde_json::Map::new(),
                    query_param: Some("query".into()),
                },
            ],
        }
    }

    /// Build a registry from configuration. An empty worker list means
    /// "use the built-in registry".
    pub fn from_config(config: &ResearchConfig) -> Self {
        if config.workers.is_empty() {
            Self::builtin()
        } else {
            Self {
                tools: config.workers.clone(),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registry names in order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}
