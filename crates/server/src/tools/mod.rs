//! MCP tool implementations.
//!
//! This module contains all tools exposed by the flyberry-sw host. Each
//! lifecycle event of the router is one tool; cache tools inspect partitions.

pub mod cache;
pub mod lifecycle;
pub mod sw_fetch;

use flyberry_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use lifecycle::{SwSyncParams, activate_impl, install_impl, sync_impl};
pub use sw_fetch::{SwFetchParams, fetch_impl};

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
