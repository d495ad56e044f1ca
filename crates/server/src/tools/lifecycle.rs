//! Lifecycle tools: sw_install, sw_activate, sw_sync.
//!
//! The host calls these in the order install → activate, and sync whenever
//! its background-sync trigger fires.

use flyberry_core::{AssetRouter, CacheStorage, Error, Fetch, router::SyncReport};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Background-sync tag sent by the host.
    pub tag: String,
}

/// Output from the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncOutput {
    /// Whether the tag matched and the prefetch ran.
    pub ran: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
}

/// Implementation of the sw_install tool.
///
/// A failed install surfaces as a tool error so the caller can retry.
pub async fn install_impl<S: CacheStorage, F: Fetch>(router: &AssetRouter<S, F>) -> Result<CallToolResult, McpError> {
    let report = router.install().await?;
    tracing::info!(cached = report.cached.len(), "install complete");
    json_result(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl<S: CacheStorage, F: Fetch>(
    router: &AssetRouter<S, F>,
) -> Result<CallToolResult, McpError> {
    let report = router.activate().await?;
    tracing::info!(deleted = report.deleted.len(), "activate complete");
    json_result(&report)
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl<S: CacheStorage, F: Fetch>(
    router: &AssetRouter<S, F>, params: SwSyncParams,
) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(Error::InvalidInput("tag cannot be empty".into()).into());
    }

    let report = router.background_sync(&params.tag).await?;
    json_result(&SwSyncOutput { ran: report.is_some(), report })
}
