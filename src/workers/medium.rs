//! Medium article-search worker
//!
//! Searches Medium for long-form articles by scraping the public search
//! page. No credentials required; a blocked or changed page degrades to an
//! error payload or an empty result list.

use super::{error_payload, json_result};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_NUM_RESULTS: u32 = 5;
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const ARTICLE_SELECTOR: &str = "div.postArticle-readMore a";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Parameters for article search
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchMediumParams {
    /// The search query
    pub query: String,
    /// Number of articles to return
    pub num_results: Option<u32>,
}

/// MCP server exposing Medium article search
#[derive(Clone)]
pub struct MediumServer {
    tool_router: ToolRouter<Self>,
    http: reqwest::Client,
    base: String,
}

#[tool_router]
impl MediumServer {
    pub fn new() -> Self {
        Self::with_base("https://medium.com")
    }

    /// Base URL is injectable so the fetch path is testable offline.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            http: reqwest::Client::new(),
            base: base.into(),
        }
    }

    /// Search Medium for articles related to a query
    #[tool(description = "Search Medium for articles related to a query")]
    async fn search_medium(
        &self,
        params: Parameters<SearchMediumParams>,
    ) -> Result<CallToolResult, McpError> {
        let num_results = params.0.num_results.unwrap_or(DEFAULT_NUM_RESULTS);
        tracing::info!(query = %params.0.query, "searching Medium");

        let response = self
            .http
            .get(format!("{}/search", self.base))
            .query(&[("q", params.0.query.as_str())])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return Ok(json_result(&error_payload(format!(
                    "Failed to fetch Medium results. {}",
                    e
                ))));
            }
        };

        if !response.status().is_success() {
            return Ok(json_result(&error_payload(format!(
                "Failed to fetch Medium results. {}",
                response.status().as_u16()
            ))));
        }

        match response.text().await {
            Ok(body) => Ok(json_result(&json!(parse_articles(
                &body,
                num_results as usize
            )))),
            Err(e) => Ok(json_result(&error_payload(format!(
                "Failed to read Medium response. {}",
                e
            )))),
        }
    }
}

/// Extract `{title, link}` records from the search page markup.
fn parse_articles(body: &str, limit: usize) -> Vec<Value> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse(ARTICLE_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .take(limit)
        .map(|link| {
            let title = link.value().attr("aria-label").unwrap_or("Untitled");
            let href = link
                .value()
                .attr("href")
                .map(strip_source_suffix)
                .unwrap_or_default();
            json!({ "title": title, "link": href })
        })
        .collect()
}

/// Medium appends `?source=...` tracking to article links.
fn strip_source_suffix(href: &str) -> &str {
    match href.find("?source") {
        Some(idx) => &href[..idx],
        None => href,
    }
}

impl Default for MediumServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for MediumServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hatchup-mcp-medium".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Medium worker - searches Medium for long-form articles".into(),
            ),
        }
    }
}

/// Serve the worker over stdio until the client disconnects.
pub async fn serve_stdio() -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = MediumServer::new();
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
