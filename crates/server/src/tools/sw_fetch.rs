//! sw_fetch tool implementation.
//!
//! Runs one request through the router, as the host would on a page fetch.

use flyberry_core::{AssetRouter, CacheStorage, Category, Error, Fetch, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Request URL, absolute or relative to the site origin.
    pub url: String,

    /// HTTP method (default: GET). Anything else is not intercepted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The resolved request URL (also the cache key).
    pub url: String,
    /// False when the router left the request to the host (non-GET).
    pub intercepted: bool,
    pub category: Category,
    /// Partition the strategy consulted.
    pub partition: String,
    pub status: Option<u16>,
    pub headers: Vec<HeaderEntry>,
    /// Body decoded as UTF-8 (lossy).
    pub body_text: Option<String>,
    pub body_len: usize,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl<S: CacheStorage, F: Fetch>(
    router: &AssetRouter<S, F>, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    let resolved = router.resolve(&params.url)?;
    let category = router.categorize(resolved.as_str())?;
    let partition = router.partition_for(category).to_string();
    let request = Request::new(params.method.trim(), resolved.as_str());

    let output = match router.route(&request).await? {
        Some(response) => SwFetchOutput {
            url: resolved.to_string(),
            intercepted: true,
            category,
            partition,
            status: Some(response.status),
            headers: response
                .headers
                .iter()
                .map(|(name, value)| HeaderEntry { name: name.clone(), value: value.clone() })
                .collect(),
            body_text: Some(String::from_utf8_lossy(&response.body).to_string()),
            body_len: response.body.len(),
        },
        None => SwFetchOutput {
            url: resolved.to_string(),
            intercepted: false,
            category,
            partition,
            status: None,
            headers: Vec::new(),
            body_text: None,
            body_len: 0,
        },
    };

    json_result(&output)
}
