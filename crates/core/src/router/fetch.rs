//! Network fetch capability consumed by the router.

use async_trait::async_trait;
use url::Url;

use crate::Error;
use crate::message::Response;

/// Issues a GET for an absolute URL.
///
/// Any HTTP status is a successful fetch and comes back as `Ok`. `Err` means
/// the network could not produce a response at all.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Response, Error>;
}
