//! Google generic web-search worker
//!
//! Searches the web via the Google Custom Search JSON API. Requires
//! `GOOGLE_API_KEY` and `SEARCH_ENGINE_ID`, both resolved at call time
//! through the layered secret lookup; a missing credential answers the
//! call with an error payload instead of failing startup.

use super::{error_payload, json_result};
use crate::utils::secrets::SecretStore;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_NUM_RESULTS: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Parameters for web search
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GoogleSearchParams {
    /// The search query
    pub query: String,
    /// Number of results to return
    pub num_results: Option<u32>,
}

/// MCP server exposing Google Custom Search
#[derive(Clone)]
pub struct GoogleServer {
    tool_router: ToolRouter<Self>,
    http: reqwest::Client,
    api_base: String,
}

#[tool_router]
impl GoogleServer {
    pub fn new() -> Self {
        Self::with_base("https://www.googleapis.com")
    }

    /// Base URL is injectable so the fetch path is testable offline.
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Search Google using the Custom Search API
    #[tool(description = "Search Google using the Custom Search API")]
    async fn google_search(
        &self,
        params: Parameters<GoogleSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let num_results = params.0.num_results.unwrap_or(DEFAULT_NUM_RESULTS);

        // Credentials are a call-time concern: a misconfigured worker still
        // registers and answers, it just answers with an error payload.
        let secrets = SecretStore::from_default_locations();
        let api_key = match secrets.require("GOOGLE_API_KEY") {
            Ok(key) => key,
            Err(e) => return Ok(json_result(&error_payload(e))),
        };
        let engine_id = match secrets.require("SEARCH_ENGINE_ID") {
            Ok(id) => id,
            Err(e) => return Ok(json_result(&error_payload(e))),
        };

        let response = self
            .http
            .get(format!("{}/customsearch/v1", self.api_base))
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", params.0.query.as_str()),
                ("num", &num_results.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("google search request failed: {}", e);
                return Ok(json_result(&error_payload(format!(
                    "Search request failed: {}",
                    e
                ))));
            }
        };

        // Non-success status surfaces the upstream body as the error, the
        // way the Custom Search API reports quota and key problems.
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(json_result(&error_payload(body)));
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(json_result(&json!(parse_items(&body)))),
            Err(e) => Ok(json_result(&error_payload(format!(
                "Search response was not JSON: {}",
                e
            )))),
        }
    }
}

/// Extract `{title, snippet, link}` records from a Custom Search response.
fn parse_items(body: &Value) -> Vec<Value> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(json!({
                        "title": item["title"].as_str()?,
                        "snippet": item["snippet"].as_str().unwrap_or(""),
                        "link": item["link"].as_str()?,
                    }))
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Default for GoogleServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for GoogleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hatchup-mcp-google".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Google worker - web search via the Custom Search JSON API".into(),
            ),
        }
    }
}

/// Serve the worker over stdio until the client disconnects.
pub async fn serve_stdio() -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = GoogleServer::new();
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server error: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::result_json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Tests below mutate GOOGLE_* env vars; serialize them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_items() {
        let body = json!({
            "items": [
                {"title": "AI agents explained", "snippet": "An overview...", "link": "https://example.com/a"},
                {"title": "No snippet", "link": "https://example.com/b"},
                {"snippet": "malformed, no title or link"}
            ]
        });

        let items = parse_items(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "AI agents explained");
        assert_eq!(items[1]["snippet"], "");
    }

    #[test]
    fn test_parse_items_zero_hits() {
        // The API omits `items` entirely when there are no hits.
        assert!(parse_items(&json!({"searchInformation": {}})).is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_error_payload() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("GOOGLE_API_KEY");

        let server = GoogleServer::new();
        let result = server
            .google_search(Parameters(GoogleSearchParams {
                query: "AI Agents".into(),
                num_results: None,
            }))
            .await
            .unwrap();

        let payload = result_json(&result);
        let error = payload["error"].as_str().unwrap();
        assert!(error.contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn test_search_against_mock_api() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "AI Agents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"title": "Agents 101", "snippet": "Intro", "link": "https://example.com"}
                ]
            })))
            .mount(&mock)
            .await;

        std::env::set_var("GOOGLE_API_KEY", "key");
        std::env::set_var("SEARCH_ENGINE_ID", "cx");

        let server = GoogleServer::with_base(mock.uri());
        let result = server
            .google_search(Parameters(GoogleSearchParams {
                query: "AI Agents".into(),
                num_results: Some(1),
            }))
            .await
            .unwrap();

        std::env::remove_var("GOOGLE_API_KEY");
        std::env::remove_var("SEARCH_ENGINE_ID");

        let records = result_json(&result);
        assert_eq!(records.as_array().unwrap().len(), 1);
        assert_eq!(records[0]["title"], "Agents 101");
    }

    #[tokio::test]
    async fn test_upstream_error_body_becomes_error_payload() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&mock)
            .await;

        std::env::set_var("GOOGLE_API_KEY", "key");
        std::env::set_var("SEARCH_ENGINE_ID", "cx");

        let server = GoogleServer::with_base(mock.uri());
        let result = server
            .google_search(Parameters(GoogleSearchParams {
                query: "anything".into(),
                num_results: None,
            }))
            .await
            .unwrap();

        std::env::remove_var("GOOGLE_API_KEY");
        std::env::remove_var("SEARCH_ENGINE_ID");

        let payload = result_json(&result);
        assert_eq!(payload["error"], "quota exceeded");
    }
}
