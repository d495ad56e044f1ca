//! cache_list tool implementation.
//!
//! Lists partitions, or the keys stored in one partition.

use flyberry_core::{AssetRouter, CacheStorage, Fetch};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// List the keys of this partition instead of the partitions themselves.
    #[serde(default)]
    pub partition: Option<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Partition names in creation order (when no partition was given).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,
    /// Keys of the requested partition, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl<S: CacheStorage, F: Fetch>(
    router: &AssetRouter<S, F>, params: CacheListParams,
) -> Result<CallToolResult, McpError> {
    let output = match params.partition {
        Some(partition) => CacheListOutput {
            partitions: Vec::new(),
            keys: router.storage().entry_keys(&partition).await?,
        },
        None => CacheListOutput {
            partitions: router.storage().partition_names().await?,
            keys: Vec::new(),
        },
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{offline_router, parse_output};
    use flyberry_core::Response;

    #[tokio::test]
    async fn test_list_partitions() {
        let router = offline_router().await;
        router.activate().await.unwrap();

        let output: CacheListOutput = parse_output(&list_impl(&router, CacheListParams::default()).await.unwrap());
        assert_eq!(output.partitions, vec!["flyberry-ultra-v1", "flyberry-static-v1", "flyberry-images-v1"]);
        assert!(output.keys.is_empty());
    }

    #[tokio::test]
    async fn test_list_partition_keys() {
        let router = offline_router().await;
        let key = router.resolve("/logo.webp").unwrap();
        router
            .storage()
            .put_entry("flyberry-images-v1", key.as_str(), Response::new(200, "img"))
            .await
            .unwrap();

        let params = CacheListParams { partition: Some("flyberry-images-v1".into()) };
        let output: CacheListOutput = parse_output(&list_impl(&router, params).await.unwrap());
        assert_eq!(output.keys, vec![key.to_string()]);
    }
}
