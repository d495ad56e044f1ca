//! Per-request caching strategies.
//!
//! Ordering is the whole contract: cache-first consults the partition before
//! touching the network, network-first hits the network before any fallback
//! lookup.

use url::Url;

use super::classify::{Category, classify};
use super::{AssetRouter, Fetch};
use crate::Error;
use crate::cache::CacheStorage;
use crate::message::{Request, Response};

impl<S: CacheStorage, F: Fetch> AssetRouter<S, F> {
    /// Resolve an intercepted request.
    ///
    /// Returns `Ok(None)` for non-GET requests, which are left to the host.
    /// Network failures are absorbed by each strategy's fallback; only the
    /// `other` category can fail with [`Error::NoResponse`] when nothing is
    /// cached.
    pub async fn route(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepted");
            return Ok(None);
        }

        let url = self.resolve(&request.url)?;
        let category = classify(url.as_str());
        let partition = self.partition_for(category).to_string();

        let response = match category {
            Category::Image | Category::StaticAsset => self.cache_first(&partition, &url, category).await?,
            Category::HtmlPage => self.network_first(&partition, &url).await?,
            Category::Other => self.network_with_fallback(&partition, &url).await?,
        };

        Ok(Some(response))
    }

    async fn cache_first(&self, partition: &str, url: &Url, category: Category) -> Result<Response, Error> {
        let key = url.as_str();
        if let Some(cached) = self.storage.match_entry(partition, key).await? {
            tracing::debug!(%category, url = key, "cache hit");
            return Ok(cached);
        }

        match self.fetcher.fetch(url).await {
            Ok(response) => {
                self.store(partition, key, &response).await;
                Ok(response)
            }
            Err(e) if category == Category::Image => {
                log_fetch_failure(key, &e, "image fetch failed");
                Ok(Response::not_found())
            }
            Err(e) => {
                log_fetch_failure(key, &e, "fetch failed, rechecking partition");
                let fallback = self.storage.match_entry(partition, key).await?;
                Ok(fallback.unwrap_or_else(Response::not_found))
            }
        }
    }

    async fn network_first(&self, partition: &str, url: &Url) -> Result<Response, Error> {
        let key = url.as_str();
        let error = match self.fetcher.fetch(url).await {
            Ok(response) => {
                self.store(partition, key, &response).await;
                return Ok(response);
            }
            Err(e) => e,
        };

        log_fetch_failure(key, &error, "page fetch failed, serving from cache");

        if let Some(cached) = self.storage.match_entry(partition, key).await? {
            return Ok(cached);
        }

        let root = self.resolve("/")?;
        if let Some(cached) = self.storage.match_entry(partition, root.as_str()).await? {
            return Ok(cached);
        }
        if let Some(cached) = self.storage.match_entry(&self.partitions.statics, root.as_str()).await? {
            return Ok(cached);
        }

        Ok(Response::not_found())
    }

    async fn network_with_fallback(&self, partition: &str, url: &Url) -> Result<Response, Error> {
        let key = url.as_str();
        match self.fetcher.fetch(url).await {
            Ok(response) => Ok(response),
            Err(error) => {
                log_fetch_failure(key, &error, "fetch failed, trying page partition");
                self.storage
                    .match_entry(partition, key)
                    .await?
                    .ok_or_else(|| Error::NoResponse(format!("{key}: {error}")))
            }
        }
    }

    /// Keep a copy of an OK response. Write failures are logged, not raised.
    async fn store(&self, partition: &str, key: &str, response: &Response) {
        if !response.is_ok() {
            tracing::debug!(url = key, status = response.status, "not caching non-OK response");
            return;
        }
        if let Err(e) = self.storage.put(partition, key, response.clone()).await {
            tracing::warn!(partition, url = key, error = %e, "cache write failed");
        }
    }
}

/// Transport failures are routine offline; anything else from the fetcher is not.
fn log_fetch_failure(url: &str, error: &Error, message: &str) {
    if error.is_fetch_failure() {
        tracing::debug!(url, %error, "{message}");
    } else {
        tracing::warn!(url, %error, "{message}");
    }
}
