//! Install, activate and background-sync handlers.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::{AssetRouter, Fetch};
use crate::Error;
use crate::cache::CacheStorage;
use crate::message::Response;

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    /// Partition that was seeded.
    pub partition: String,
    /// Keys written, in critical-list order.
    pub cached: Vec<String>,
    /// The new worker should take over without waiting for old instances.
    pub skip_waiting: bool,
}

/// Outcome of activation.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    /// Partitions removed because they belong to an older version.
    pub deleted: Vec<String>,
    /// Current-version partitions.
    pub kept: Vec<String>,
    /// Open clients were claimed immediately.
    pub claimed: bool,
}

/// Outcome of a background sync run.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SyncReport {
    pub tag: String,
    pub stored: Vec<String>,
    pub failed: Vec<String>,
}

impl<S: CacheStorage, F: Fetch> AssetRouter<S, F> {
    /// Seed the static partition with the critical resource list.
    ///
    /// All-or-nothing: every resource must fetch with an OK status before
    /// anything is written, and the write itself is a single transaction.
    ///
    /// # Errors
    ///
    /// Returns the first fetch failure (network error or non-OK status) so the
    /// host can retry the install.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let partition = self.partitions.statics.clone();
        self.storage.open(&partition).await?;

        tracing::info!(partition = %partition, count = self.critical_resources.len(), "caching critical resources");

        let urls = self
            .critical_resources
            .iter()
            .map(|path| self.resolve(path))
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = urls.iter().map(|url| async move {
            let response = self.fetcher.fetch(url).await?;
            if !response.is_ok() {
                return Err(Error::HttpError(format!("{url} returned status {}", response.status)));
            }
            Ok::<(String, Response), Error>((url.to_string(), response))
        });

        let entries = try_join_all(fetches).await.inspect_err(|e| {
            tracing::warn!(error = %e, "install failed, nothing cached");
        })?;

        let cached = entries.iter().map(|(key, _)| key.clone()).collect();
        self.storage.put_all(&partition, entries).await?;

        Ok(InstallReport { partition, cached, skip_waiting: true })
    }

    /// Delete partitions left behind by older versions, then claim clients.
    ///
    /// Only partitions carrying this product's prefix are considered. The
    /// three current partitions are opened afterwards so they always exist.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let stale: Vec<String> = self
            .storage
            .partition_names()
            .await?
            .into_iter()
            .filter(|name| name.starts_with(&self.prefix) && !self.partitions.contains(name))
            .collect();

        let deletions = stale.iter().map(|name| async move {
            tracing::info!(partition = %name, "deleting old cache");
            self.storage.delete_partition(name).await
        });
        try_join_all(deletions).await?;

        for name in self.partitions.all() {
            self.storage.open(name).await?;
        }

        Ok(ActivateReport {
            deleted: stale,
            kept: self.partitions.all().iter().map(|name| name.to_string()).collect(),
            claimed: true,
        })
    }

    /// Prefetch likely next pages into the static partition.
    ///
    /// Returns `Ok(None)` when `tag` is not the configured sync tag. Each URL
    /// is attempted on its own; a failure is recorded and the rest continue.
    pub async fn background_sync(&self, tag: &str) -> Result<Option<SyncReport>, Error> {
        if tag != self.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(None);
        }

        let partition = &self.partitions.statics;
        self.storage.open(partition).await?;

        let mut report = SyncReport { tag: tag.to_string(), stored: Vec::new(), failed: Vec::new() };

        for path in &self.prefetch_urls {
            let url = match self.resolve(path) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(url = %path, error = %e, "prefetch failed");
                    report.failed.push(path.clone());
                    continue;
                }
            };

            let stored = match self.fetcher.fetch(&url).await {
                Ok(response) if response.is_ok() => self.storage.put(partition, url.as_str(), response).await,
                Ok(response) => Err(Error::HttpError(format!("status {}", response.status))),
                Err(e) => Err(e),
            };

            match stored {
                Ok(()) => report.stored.push(url.to_string()),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "prefetch failed");
                    report.failed.push(url.to_string());
                }
            }
        }

        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{MockFetch, ORIGIN, ok};
    use super::*;
    use crate::cache::CacheDb;
    use crate::config::WorkerConfig;
    use crate::message::Request;

    fn key(path: &str) -> String {
        format!("{ORIGIN}{path}")
    }

    async fn router_with(fetch: MockFetch, config: WorkerConfig) -> AssetRouter<CacheDb, MockFetch> {
        let db = CacheDb::open_in_memory().await.unwrap();
        AssetRouter::new(db, fetch, &config).unwrap()
    }

    fn critical(paths: &[&str]) -> WorkerConfig {
        WorkerConfig { critical_resources: paths.iter().map(|p| p.to_string()).collect(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_install_seeds_static_partition() {
        let fetch = MockFetch::new().serve("/", ok("root")).serve("/index.html", ok("index"));
        let router = router_with(fetch, critical(&["/", "/index.html"])).await;

        let report = router.install().await.unwrap();
        assert!(report.skip_waiting);
        assert_eq!(report.partition, "flyberry-static-v1");
        assert_eq!(report.cached, vec![key("/"), key("/index.html")]);

        let keys = router.storage().entry_keys("flyberry-static-v1").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&key("/")));
        assert!(keys.contains(&key("/index.html")));
    }

    #[tokio::test]
    async fn test_install_all_or_nothing_on_network_error() {
        let fetch = MockFetch::new().serve("/", ok("root"));
        let router = router_with(fetch, critical(&["/", "/index.html"])).await;

        let result = router.install().await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(router.storage().entry_keys("flyberry-static-v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_all_or_nothing_on_bad_status() {
        let fetch = MockFetch::new()
            .serve("/", ok("root"))
            .serve("/index.html", Response::new(500, "boom"));
        let router = router_with(fetch, critical(&["/", "/index.html"])).await;

        let result = router.install().await;
        assert!(matches!(result, Err(Error::HttpError(_))));
        assert!(router.storage().entry_keys("flyberry-static-v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_can_be_retried() {
        let fetch = MockFetch::new().serve("/", ok("root"));
        let router = router_with(fetch, critical(&["/", "/index.html"])).await;
        assert!(router.install().await.is_err());

        router.fetcher.set("/index.html", ok("index"));
        let report = router.install().await.unwrap();
        assert_eq!(report.cached.len(), 2);
    }

    #[tokio::test]
    async fn test_installed_assets_served_offline() {
        let fetch = MockFetch::new()
            .serve("/", ok("root"))
            .serve("/css/critical.css", ok("css"));
        let router = router_with(fetch, critical(&["/", "/css/critical.css"])).await;
        router.install().await.unwrap();
        router.fetcher.go_offline();
        let calls_before = router.fetcher.calls();

        let css = router.route(&Request::get("/css/critical.css")).await.unwrap().unwrap();
        assert_eq!(&css.body[..], b"css");
        assert_eq!(router.fetcher.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_activate_prunes_old_versions() {
        let router = router_with(MockFetch::new(), WorkerConfig::default()).await;
        let storage = router.storage();
        storage.open_partition("flyberry-static-v0").await.unwrap();
        storage
            .put_entry("flyberry-images-v0", &key("/logo.webp"), ok("old"))
            .await
            .unwrap();
        storage.open_partition("flyberry-static-v1").await.unwrap();
        storage.open_partition("someone-else-v0").await.unwrap();

        let report = router.activate().await.unwrap();
        assert!(report.claimed);
        assert_eq!(report.deleted, vec!["flyberry-static-v0", "flyberry-images-v0"]);

        let mut names = storage.partition_names().await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec!["flyberry-images-v1", "flyberry-static-v1", "flyberry-ultra-v1", "someone-else-v0"]
        );
    }

    #[tokio::test]
    async fn test_activate_after_version_bump() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let v1 = AssetRouter::new(db.clone(), MockFetch::new(), &WorkerConfig::default()).unwrap();
        v1.activate().await.unwrap();

        let config = WorkerConfig { cache_version: "v2".into(), ..Default::default() };
        let v2 = AssetRouter::new(db.clone(), MockFetch::new(), &config).unwrap();
        let report = v2.activate().await.unwrap();

        assert_eq!(report.deleted.len(), 3);
        let names: Vec<String> = db
            .partition_names()
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.starts_with("flyberry-"))
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| n.ends_with("-v2")));
    }

    #[tokio::test]
    async fn test_sync_ignores_other_tags() {
        let router = router_with(MockFetch::new(), WorkerConfig::default()).await;
        assert!(router.background_sync("periodic").await.unwrap().is_none());
        assert_eq!(router.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_sync_prefetches_independently() {
        let fetch = MockFetch::new()
            .serve("/selection.html", ok("selection"))
            .serve("/byob.html", Response::new(503, "busy"))
            .serve("/premade.html", ok("premade"));
        let router = router_with(fetch, WorkerConfig::default()).await;

        let report = router.background_sync("background-sync").await.unwrap().unwrap();
        assert_eq!(report.stored, vec![key("/selection.html"), key("/premade.html")]);
        assert_eq!(report.failed, vec![key("/byob.html")]);
        assert_eq!(router.fetcher.calls(), 3);

        let keys = router.storage().entry_keys("flyberry-static-v1").await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_sync_offline_records_every_failure() {
        let fetch = MockFetch::new();
        fetch.go_offline();
        let router = router_with(fetch, WorkerConfig::default()).await;

        let report = router.background_sync("background-sync").await.unwrap().unwrap();
        assert!(report.stored.is_empty());
        assert_eq!(report.failed.len(), 3);
        assert_eq!(router.fetcher.requested().len(), 3);
    }
}
