//! Durable key-value cache capability consumed by the router.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::Error;
use crate::message::Response;

/// Named-partition cache store.
///
/// Writes take ownership of the response they store, so a caller that also
/// needs to return the response must hand over a clone.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a partition, creating it if needed.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    async fn match_entry(&self, partition: &str, key: &str) -> Result<Option<Response>, Error>;

    async fn put(&self, partition: &str, key: &str, response: Response) -> Result<(), Error>;

    /// Write every entry or none.
    async fn put_all(&self, partition: &str, entries: Vec<(String, Response)>) -> Result<(), Error>;

    /// Partition names in creation order.
    async fn partition_names(&self) -> Result<Vec<String>, Error>;

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error>;

    async fn entry_keys(&self, partition: &str) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        self.open_partition(partition).await
    }

    async fn match_entry(&self, partition: &str, key: &str) -> Result<Option<Response>, Error> {
        CacheDb::match_entry(self, partition, key).await
    }

    async fn put(&self, partition: &str, key: &str, response: Response) -> Result<(), Error> {
        self.put_entry(partition, key, response).await
    }

    async fn put_all(&self, partition: &str, entries: Vec<(String, Response)>) -> Result<(), Error> {
        self.put_entries(partition, entries).await
    }

    async fn partition_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::partition_names(self).await
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, Error> {
        CacheDb::delete_partition(self, partition).await
    }

    async fn entry_keys(&self, partition: &str) -> Result<Vec<String>, Error> {
        CacheDb::entry_keys(self, partition).await
    }
}
