//! Asset cache router.
//!
//! Intercepts page requests and resolves each one through one of four
//! strategies chosen by URL shape:
//!
//! | category       | strategy                          | partition |
//! |----------------|-----------------------------------|-----------|
//! | `image`        | cache first                       | images    |
//! | `static-asset` | cache first                       | static    |
//! | `html-page`    | network first, cache fallback     | pages     |
//! | `other`        | network, cache fallback           | pages     |
//!
//! Lifecycle events (`install`, `activate`, `background_sync`) seed and prune
//! the partitions. The router holds no mutable state of its own; everything
//! lives in the [`CacheStorage`] it was built with.

pub mod classify;
pub mod fetch;
pub mod lifecycle;
pub mod strategy;

pub use classify::{Category, classify};
pub use fetch::Fetch;
pub use lifecycle::{ActivateReport, InstallReport, SyncReport};

use url::Url;

use crate::Error;
use crate::cache::CacheStorage;
use crate::config::{PartitionNames, WorkerConfig};

/// Routes intercepted requests between the network and the cache partitions.
pub struct AssetRouter<S, F> {
    storage: S,
    fetcher: F,
    origin: Url,
    prefix: String,
    partitions: PartitionNames,
    critical_resources: Vec<String>,
    prefetch_urls: Vec<String>,
    sync_tag: String,
}

impl<S: CacheStorage, F: Fetch> AssetRouter<S, F> {
    /// Build a router from validated configuration.
    pub fn new(storage: S, fetcher: F, config: &WorkerConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;

        Ok(Self {
            storage,
            fetcher,
            origin,
            prefix: config.cache_prefix.clone(),
            partitions: config.partitions(),
            critical_resources: config.critical_resources.clone(),
            prefetch_urls: config.prefetch_urls.clone(),
            sync_tag: config.sync_tag.clone(),
        })
    }

    /// Resolve a request URL to its cache key form.
    ///
    /// Relative paths resolve against the origin; the fragment is dropped.
    pub fn resolve(&self, url: &str) -> Result<Url, Error> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("empty URL".into()));
        }
        let mut resolved = self
            .origin
            .join(trimmed)
            .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;
        resolved.set_fragment(None);
        Ok(resolved)
    }

    /// Category the router would pick for a URL.
    pub fn categorize(&self, url: &str) -> Result<Category, Error> {
        Ok(classify(self.resolve(url)?.as_str()))
    }

    /// Partition consulted for a category.
    pub fn partition_for(&self, category: Category) -> &str {
        match category {
            Category::Image => &self.partitions.images,
            Category::StaticAsset => &self.partitions.statics,
            Category::HtmlPage | Category::Other => &self.partitions.pages,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
