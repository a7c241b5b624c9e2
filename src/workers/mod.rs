//! Retrieval worker servers
//!
//! Each worker is an independent MCP stdio server, built as its own binary
//! and launched as a long-lived subprocess by the session manager. A worker
//! performs its own network I/O and converts every upstream failure -
//! missing credentials, non-success status, malformed response, zero hits -
//! into a structured error payload rather than terminating. One bad input
//! must never take the hosting process down.
//!
//! Credentials are resolved at call time through the layered
//! [`SecretStore`](crate::utils::secrets::SecretStore) lookup, so a
//! misconfigured worker still registers and answers (with an error payload)
//! instead of blocking its siblings.

/// Google Custom Search worker.
pub mod google;
/// Medium article-search worker.
pub mod medium;
/// Reddit community-discussion worker.
pub mod reddit;
/// Wikipedia encyclopedic-lookup worker.
pub mod wikipedia;

use rmcp::model::{CallToolResult, Content};

/// Frame a JSON payload as a successful tool result.
///
/// Workers always return payloads, including error payloads, this way:
/// upstream failures are data to the orchestrator, not protocol errors.
pub(crate) fn json_result(value: &serde_json::Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(value.to_string())])
}

/// `{ "error": <message> }`
pub(crate) fn error_payload(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

#[cfg(test)]
pub(crate) fn result_json(result: &CallToolResult) -> serde_json::Value {
    let text = result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n");
    serde_json::from_str(&text).expect("worker returned non-JSON payload")
}
