//! Reddit community-discussion worker
//!
//! Fetches hot posts and their top comments from a subreddit via the
//! Reddit API (app-only OAuth). Credentials (`REDDIT_CLIENT_ID`,
//! `REDDIT_CLIENT_SECRET`, optional `USER_AGENT`) are resolved at call
//! time; a missing credential answers the call with
//! `{ "error": ..., "posts": [] }` instead of failing startup.

use super::{error_payload, json_result};
use crate::utils::secrets::SecretStore;
use anyhow::{Context, anyhow, bail};
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

const DEFAULT_SUBREDDIT: &str = "all";
const DEFAULT_LIMIT: u32 = 5;
const DEFAULT_COMMENTS_PER_POST: u32 = 15;
const DEFAULT_USER_AGENT: &str = "echolab-mcp-reddit/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Parameters for fetching subreddit posts
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FetchPostsParams {
    /// Subreddit to read (defaults to "all")
    pub subreddit: Option<String>,
    /// Number of hot posts to fetch
    pub limit: Option<u32>,
    /// Top-level comments to include per post
    pub comments_per_post: Option<u32>,
}

/// MCP server exposing Reddit community discussion
#[derive(Clone)]
pub struct RedditServer {
    tool_router: ToolRouter<Self>,
    http: reqwest::Client,
    auth_base: String,
    api_base: String,
}

#[tool_router]
impl RedditServer {
    pub fn new() -> Self {
        Self::with_bases("https://www.reddit.com", "https://oauth.reddit.com")
    }

    /// Base URLs are injectable so the fetch path is testable offline.
    pub fn with_bases(auth_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            http: reqwest::Client::new(),
            auth_base: auth_base.into(),
            api_base: api_base.into(),
        }
    }

    /// Fetch hot posts and top comments from a subreddit
    #[tool(description = "Fetch hot posts and top comments from a subreddit")]
    async fn fetch_reddit_posts_with_comments(
        &self,
        params: Parameters<FetchPostsParams>,
    ) -> Result<CallToolResult, McpError> {
        let subreddit = params
            .0
            .subreddit
            .unwrap_or_else(|| DEFAULT_SUBREDDIT.to_string());
        let limit = params.0.limit.unwrap_or(DEFAULT_LIMIT);
        let comments_per_post = params.0.comments_per_post.unwrap_or(DEFAULT_COMMENTS_PER_POST);

        match self.fetch_posts(&subreddit, limit, comments_per_post).await {
            Ok(posts) => Ok(json_result(&json!({ "posts": posts }))),
            Err(e) => {
                tracing::warn!(subreddit = %subreddit, "reddit fetch failed: {:#}", e);
                let mut payload = error_payload(format!("{:#}", e));
                payload["posts"] = json!([]);
                Ok(json_result(&payload))
            }
        }
    }
}

impl RedditServer {
    /// App-only OAuth token via the client-credentials grant.
    async fn access_token(&self, secrets: &SecretStore, user_agent: &str) -> anyhow::Result<String> {
        let client_id = secrets.require("REDDIT_CLIENT_ID").map_err(|e| anyhow!(e))?;
        let client_secret = secrets
            .require("REDDIT_CLIENT_SECRET")
            .map_err(|e| anyhow!(e))?;

        let response = self
            .http
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .basic_auth(&client_id, Some(&client_secret))
            .header(reqwest::header::USER_AGENT, user_agent)
            .form(&[("grant_type", "client_credentials")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Reddit token request failed")?;

        if !response.status().is_success() {
            bail!("Reddit auth failed with status {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Reddit token response was not JSON")?;
        body["access_token"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Reddit token response had no access_token"))
    }

    async fn fetch_posts(
        &self,
        subreddit: &str,
        limit: u32,
        comments_per_post: u32,
    ) -> anyhow::Result<Vec<Value>> {
        let secrets = SecretStore::from_default_locations();
        let user_agent = secrets
            .lookup("USER_AGENT")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let token = self.access_token(&secrets, &user_agent).await?;

        let response = self
            .http
            .get(format!("{}/r/{}/hot", self.api_base, subreddit))
            .query(&[("limit", limit.to_string())])
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, &user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Reddit listing request failed")?;

        if !response.status().is_success() {
            bail!("Reddit listing failed with status {}", response.status());
        }

        let listing: Value = response
            .json()
            .await
            .context("Reddit listing response was not JSON")?;

        let mut posts = parse_listing_posts(&listing);

        for post in &mut posts {
            let Some(id) = post["id"].as_str().map(|s| s.to_string()) else {
                continue;
            };

            let comments_response = self
                .http
                .get(format!("{}/r/{}/comments/{}", self.api_base, subreddit, id))
                .query(&[
                    ("limit", comments_per_post.to_string()),
                    ("depth", "1".to_string()),
                ])
                .bearer_auth(&token)
                .header(reqwest::header::USER_AGENT, &user_agent)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            // Comment failures degrade to an empty comment list; the post
            // itself is still useful.
            if let Ok(resp) = comments_response {
                if let Ok(thread) = resp.json::<Value>().await {
                    post["comments"] = json!(parse_comments(&thread, comments_per_post as usize));
                }
            }
        }

        Ok(posts)
    }
}

/// Extract post records from a Reddit listing response.
fn parse_listing_posts(listing: &Value) -> Vec<Value> {
    let children = listing["data"]["children"].as_array();
    children
        .map(|children| children.iter().filter_map(parse_post).collect())
        .unwrap_or_default()
}

fn parse_post(child: &Value) -> Option<Value> {
    let data = child.get("data")?;
    let permalink = data["permalink"].as_str().unwrap_or_default();

    Some(json!({
        "id": data["id"].as_str()?,
        "title": data["title"].as_str().unwrap_or("Untitled"),
        "author": data["author"].as_str().unwrap_or("deleted"),
        "url": format!("https://reddit.com{}", permalink),
        "score": data["score"].as_i64().unwrap_or(0),
        "num_comments": data["num_comments"].as_i64().unwrap_or(0),
        "created_utc": data["created_utc"].as_f64().unwrap_or(0.0),
        "comments": [],
    }))
}

/// Extract top-level comments from a comment-thread response.
///
/// The thread endpoint returns `[post listing, comment listing]`; only
/// `t1` children of the second listing are comments.
fn parse_comments(thread: &Value, limit: usize) -> Vec<Value> {
    let Some(comment_listing) = thread.get(1) else {
        return Vec::new();
    };

    let children = comment_listing["data"]["children"].as_array();
    children
        .map(|children| {
            children
                .iter()
                .filter(|c| c["kind"].as_str() == Some("t1"))
                .take(limit)
                .map(|c| {
                    let data = &c["data"];
                    json!({
                        "author": data["author"].as_str().unwrap_or("deleted"),
                        "body": data["body"].as_str().unwrap_or(""),
                        "score": data["score"].as_i64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Default for RedditServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for RedditServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hatchup-mcp-reddit".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Reddit worker - fetches hot posts and top comments from a subreddit".into(),
            ),
        }
    }
}

/// Serve the worker over stdio until the client disconnects.
pub async fn serve_stdio() -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = RedditServer::new();
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
