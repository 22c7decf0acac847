use async_trait::async_trait;
use std::path::Path;

use super::FetchError;

/// Downloads a URL into a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Stream the body of `url` into `destination`, creating or truncating
    /// it. Returns the number of bytes written. A failed fetch may leave a
    /// partial file behind.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
}
