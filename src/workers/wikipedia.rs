//! Wikipedia encyclopedic-lookup worker
//!
//! Searches Wikipedia and returns titles with short summaries and canonical
//! URLs via the public MediaWiki API. No credentials required.

use super::{error_payload, json_result};
use anyhow::{Context, bail};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_LIMIT: u32 = 5;
const SUMMARY_SENTENCES: u32 = 2;
const SUMMARY_FALLBACK: &str = "Summary not available";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Parameters for searching Wikipedia
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchParams {
    /// The search query
    pub query: String,
    /// Maximum number of results to return
    pub limit: Option<u32>,
}

/// Parameters for fetching a page summary
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetPageParams {
    /// Exact page title
    pub title: String,
}

/// MCP server exposing encyclopedic lookup
#[derive(Clone)]
pub struct WikipediaServer {
    tool_router: ToolRouter<Self>,
    http: reqwest::Client,
    api_base: String,
}

#[tool_router]
impl WikipediaServer {
    pub fn new() -> Self {
        Self::with_base("https://en.wikipedia.org")
    }

    /// Base URL is injectable so the fetch path is testable offline.
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Health check
    #[tool(description = "Health check")]
    async fn ping(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            "Wikipedia MCP is running!",
        )]))
    }

    /// Search Wikipedia for a query
    #[tool(description = "Search Wikipedia and return titles, summaries, and URLs")]
    async fn search(&self, params: Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let limit = params.0.limit.unwrap_or(DEFAULT_LIMIT);

        match self.search_titles(&params.0.query, limit).await {
            Ok(titles) => {
                let mut records = Vec::new();
                for title in titles {
                    // A failed summary lookup is a data condition for that
                    // one record, not for the whole search.
                    let summary = self
                        .page_summary(&title, Some(SUMMARY_SENTENCES))
                        .await
                        .unwrap_or_else(|_| SUMMARY_FALLBACK.to_string());
                    records.push(json!({
                        "title": title,
                        "summary": summary,
                        "url": page_url(&title),
                    }));
                }
                Ok(json_result(&json!(records)))
            }
            Err(e) => {
                tracing::warn!("wikipedia search failed: {:#}", e);
                Ok(json_result(&error_payload(format!("{:#}", e))))
            }
        }
    }

    /// Get a page summary
    #[tool(description = "Get the summary of a Wikipedia page by exact title")]
    async fn get_page(&self, params: Parameters<GetPageParams>) -> Result<CallToolResult, McpError> {
        let title = params.0.title;

        match self.page_summary(&title, None).await {
            Ok(summary) => Ok(json_result(&json!({
                "title": title,
                "summary": summary,
                "url": page_url(&title),
            }))),
            Err(e) => Ok(json_result(&error_payload(format!("{:#}", e)))),
        }
    }
}

impl WikipediaServer {
    async fn search_titles(&self, query: &str, limit: u32) -> anyhow::Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/w/api.php", self.api_base))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit.to_string()),
                ("format", "json"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Wikipedia search request failed")?;

        if !response.status().is_success() {
            bail!("Wikipedia search failed with status {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Wikipedia search response was not JSON")?;
        Ok(parse_search_titles(&body))
    }

    /// Plain-text intro extract for a page, optionally capped to a number
    /// of sentences.
    async fn page_summary(&self, title: &str, sentences: Option<u32>) -> anyhow::Result<String> {
        let mut query = vec![
            ("action", "query".to_string()),
            ("prop", "extracts".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("titles", title.to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(n) = sentences {
            query.push(("exsentences", n.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/w/api.php", self.api_base))
            .query(&query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Wikipedia extract request failed")?;

        if !response.status().is_success() {
            bail!("Wikipedia extract failed with status {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Wikipedia extract response was not JSON")?;
        parse_extract(&body).ok_or_else(|| anyhow::anyhow!("No extract for page '{}'", title))
    }
}

fn page_url(title: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

fn parse_search_titles(body: &Value) -> Vec<String> {
    body["query"]["search"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r["title"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_extract(body: &Value) -> Option<String> {
    let pages = body["query"]["pages"].as_object()?;
    let page = pages.values().next()?;
    let extract = page["extract"].as_str()?;
    if extract.is_empty() {
        return None;
    }
    Some(extract.to_string())
}

impl Default for WikipediaServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for WikipediaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hatchup-mcp-wikipedia".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Wikipedia worker - searches pages and returns titles, summaries, and URLs".into(),
            ),
        }
    }
}

/// Serve the worker over stdio until the client disconnects.
pub async fn serve_stdio() -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = WikipediaServer::new();
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_search_titles() {
        let body = json!({
            "query": {
                "search": [
                    {"title": "Artificial intelligence", "pageid": 1},
                    {"title": "Intelligent agent", "pageid": 2}
                ]
            }
        });
        assert_eq!(
            parse_search_titles(&body),
            vec!["Artificial intelligence", "Intelligent agent"]
        );
    }

    #[test]
    fn test_parse_search_titles_tolerates_garbage() {
        assert!(parse_search_titles(&json!({"batchcomplete": ""})).is_empty());
    }

    #[test]
    fn test_parse_extract() {
        let body = json!({
            "query": {
                "pages": {
                    "9251": {"title": "AI", "extract": "AI is intelligence demonstrated by machines."}
                }
            }
        });
        assert_eq!(
            parse_extract(&body).unwrap(),
            "AI is intelligence demonstrated by machines."
        );
        assert!(parse_extract(&json!({})).is_none());
    }

    #[test]
    fn test_page_url_replaces_spaces() {
        assert_eq!(
            page_url("Intelligent agent"),
            "https://en.wikipedia.org/wiki/Intelligent_agent"
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let server = WikipediaServer::new();
        let result = server.ping().await.unwrap();
        let text = result.content[0].as_text().unwrap().text.clone();
        assert_eq!(text, "Wikipedia MCP is running!");
    }

    #[tokio::test]
    async fn test_search_against_mock_api() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Intelligent agent"}]}
            })))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"1": {"extract": "An agent that acts."}}}
            })))
            .mount(&mock)
            .await;

        let server = WikipediaServer::with_base(mock.uri());
        let result = server
            .search(Parameters(SearchParams {
                query: "AI Agents".into(),
                limit: Some(1),
            }))
            .await
            .unwrap();

        let records = result_json(&result);
        assert_eq!(records.as_array().unwrap().len(), 1);
        assert_eq!(records[0]["title"], "Intelligent agent");
        assert_eq!(records[0]["summary"], "An agent that acts.");
        assert_eq!(
            records[0]["url"],
            "https://en.wikipedia.org/wiki/Intelligent_agent"
        );
    }

    #[tokio::test]
    async fn test_search_upstream_failure_is_error_payload() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock)
            .await;

        let server = WikipediaServer::with_base(mock.uri());
        let result = server
            .search(Parameters(SearchParams {
                query: "anything".into(),
                limit: None,
            }))
            .await
            .unwrap();

        let payload = result_json(&result);
        assert!(payload["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_summary_fallback_when_extract_missing() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"search": [{"title": "Obscure page"}]}
            })))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"1": {"title": "Obscure page"}}}
            })))
            .mount(&mock)
            .await;

        let server = WikipediaServer::with_base(mock.uri());
        let result = server
            .search(Parameters(SearchParams {
                query: "obscure".into(),
                limit: Some(1),
            }))
            .await
            .unwrap();

        let records = result_json(&result);
        assert_eq!(records[0]["summary"], SUMMARY_FALLBACK);
    }
}
