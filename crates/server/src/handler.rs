//! MCP server handler implementation.
//!
//! This module defines the host handler that maps each router lifecycle
//! event, and the cache inspection tools, onto MCP tool calls.
use std::sync::Arc;

use crate::tools::{
    SwFetchParams, SwSyncParams, activate_impl,
    cache::{CacheGetParams, CacheListParams, get_impl, list_impl},
    fetch_impl, install_impl, sync_impl,
};

use flyberry_client::FetchClient;
use flyberry_core::{AssetRouter, CacheDb};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Router wired to the SQLite store and the reqwest client.
pub type WorkerRouter = AssetRouter<CacheDb, FetchClient>;

/// The MCP host for the asset cache router.
#[derive(Clone)]
pub struct FlyberryWorker {
    router: Arc<WorkerRouter>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl FlyberryWorker {
    /// Create a new server handler.
    pub fn new(router: Arc<WorkerRouter>) -> Self {
        Self { router, tool_router: Self::tool_router() }
    }

    /// Seed the static partition with the critical resource list.
    #[tool(description = "Install event: fetch every critical resource and seed the static cache. Fails as a whole if any fetch fails.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.router).await
    }

    /// Prune partitions from older versions.
    #[tool(description = "Activate event: delete caches from previous versions and claim clients.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.router).await
    }

    /// Route one request through the caching strategies.
    #[tool(description = "Fetch event: resolve a request through the cache strategy chosen by its URL.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.router, params.0).await
    }

    /// Prefetch likely next pages.
    #[tool(description = "Sync event: prefetch likely next pages when the tag matches the configured sync tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.router, params.0).await
    }

    #[tool(description = "List cache partitions, or the keys stored in one partition.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.router, params.0).await
    }

    #[tool(description = "Read one cached response by partition and URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.router, params.0).await
    }
}

impl ServerHandler for FlyberryWorker {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "flyberry-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
