//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::fetch::{FetchError, Fetcher};

/// What the mock answers for a URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Write these bytes to the destination.
    Body(Vec<u8>),
    /// Fail as if the origin returned this status.
    Status(u16),
}

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Serve canned bodies per URL (unknown URLs answer 404)
/// - Simulate error statuses
/// - Hold fetches until released, to observe in-flight jobs
/// - Record requested URLs for assertions
///
/// # Example
///
/// ```rust,ignore
/// use depot_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_body("http://example.com/a", b"ABC".to_vec()).await;
///
/// // ... submit through a DownloadPipeline ...
///
/// assert_eq!(fetcher.requests().await, vec!["http://example.com/a"]);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    requests: Arc<RwLock<Vec<String>>>,
    /// `true` while fetches are held.
    gate: watch::Sender<bool>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher with no configured URLs.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            gate,
        }
    }

    /// Serve `body` for `url`.
    pub async fn set_body(&self, url: &str, body: Vec<u8>) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Body(body));
    }

    /// Fail fetches of `url` with the given HTTP status.
    pub async fn set_error(&self, url: &str, status: u16) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), MockResponse::Status(status));
    }

    /// URLs fetched so far, in call order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Make subsequent and in-flight fetches wait until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(true);
    }

    /// Let held fetches continue.
    pub fn release(&self) {
        self.gate.send_replace(false);
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        self.requests.write().await.push(url.to_string());

        let mut gate = self.gate.subscribe();
        // The sender lives in self, so this only ends when released
        let _ = gate.wait_for(|held| !*held).await;

        let response = self.responses.read().await.get(url).cloned();
        match response {
            Some(MockResponse::Body(body)) => {
                tokio::fs::write(destination, &body)
                    .await
                    .map_err(|e| FetchError::CreateFile {
                        path: destination.to_path_buf(),
                        source: e,
                    })?;
                Ok(body.len() as u64)
            }
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_serves_configured_body() {
        let fetcher = MockFetcher::new();
        fetcher.set_body("http://example.com/a", b"ABC".to_vec()).await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file");

        let n = fetcher.fetch("http://example.com/a", &dest).await.unwrap();

        assert_eq!(n, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"ABC");
        assert_eq!(fetcher.requests().await, vec!["http://example.com/a"]);
    }

    #[tokio::test]
    async fn test_unknown_url_is_404() {
        let fetcher = MockFetcher::new();
        let dir = TempDir::new().unwrap();

        let result = fetcher.fetch("http://nowhere/", &dir.path().join("f")).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_hold_and_release() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set_body("http://example.com/a", b"x".to_vec()).await;
        fetcher.hold();

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file");
        let task = {
            let fetcher = Arc::clone(&fetcher);
            let dest = dest.clone();
            tokio::spawn(async move { fetcher.fetch("http://example.com/a", &dest).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());
        assert!(!dest.exists());

        fetcher.release();
        assert_eq!(task.await.unwrap().unwrap(), 1);
    }
}
