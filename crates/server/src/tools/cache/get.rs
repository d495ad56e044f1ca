//! cache_get tool implementation.
//!
//! Retrieves one stored response from a partition.

use flyberry_core::{AssetRouter, CacheStorage, Error, Fetch};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Partition name, e.g. "flyberry-static-v1".
    pub partition: String,
    /// Request URL, absolute or relative to the site origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub partition: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body_len: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<S: CacheStorage, F: Fetch>(
    router: &AssetRouter<S, F>, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let key = router.resolve(&params.url)?;
    let response = router
        .storage()
        .match_entry(&params.partition, key.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} in {}", key, params.partition)))?;

    json_result(&CacheGetOutput {
        partition: params.partition,
        url: key.to_string(),
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body_len: response.body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{offline_router, parse_output};
    use flyberry_core::Response;

    #[tokio::test]
    async fn test_get_impl_missing() {
        let router = offline_router().await;
        let params = CacheGetParams { partition: "flyberry-static-v1".into(), url: "/".into() };

        let result = get_impl(&router, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let router = offline_router().await;
        let key = router.resolve("/css/critical.css").unwrap();
        router
            .storage()
            .put_entry(
                "flyberry-static-v1",
                key.as_str(),
                Response::new(200, "body{}").with_header("Content-Type", "text/css"),
            )
            .await
            .unwrap();

        let params = CacheGetParams { partition: "flyberry-static-v1".into(), url: "/css/critical.css".into() };
        let output: CacheGetOutput = parse_output(&get_impl(&router, params).await.unwrap());
        assert_eq!(output.status, 200);
        assert_eq!(output.content_type.as_deref(), Some("text/css"));
        assert_eq!(output.body_len, 6);
    }
}
