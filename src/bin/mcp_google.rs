//! Google retrieval worker binary - MCP server over stdio.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> hatchup::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the MCP channel; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Google Search MCP server is running...");
    hatchup::workers::google::serve_stdio().await
}
