//! flyberry-sw host entry point.
//!
//! Boots the asset cache router and serves its lifecycle events as MCP tools
//! on stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use flyberry_client::{FetchClient, FetchConfig};
use flyberry_core::{AssetRouter, CacheDb, WorkerConfig};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = WorkerConfig::load()?;
    let partitions = config.partitions();
    tracing::info!(
        origin = %config.origin,
        db_path = %config.db_path.display(),
        pages = %partitions.pages,
        statics = %partitions.statics,
        images = %partitions.images,
        "Starting flyberry-sw on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig::from(&config))?;
    let router = AssetRouter::new(db, client, &config)?;

    let handler = handler::FlyberryWorker::new(Arc::new(router));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
