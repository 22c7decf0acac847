//! reqwest-backed fetcher.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{FetchError, Fetcher};
use crate::config::FetchConfig;

#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// Streams response bodies straight to disk.
pub struct HttpFetcher {
    client: Client,
    accept_error_status: bool,
}

impl HttpFetcher {
    /// Build a fetcher from the `[fetch]` configuration section.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for outbound fetches");
        }

        let mut builder = Client::builder()
            .user_agent(concat!("depot/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            client,
            accept_error_status: config.accept_error_status,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options
            .open(destination)
            .await
            .map_err(|e| FetchError::CreateFile {
                path: destination.to_path_buf(),
                source: e,
            })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            if !self.accept_error_status {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            debug!(url = %url, status = %status, "Keeping body of error response");
        }

        let write_err = |e| FetchError::Write {
            path: destination.to_path_buf(),
            source: e,
        };

        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| FetchError::Body {
                url: url.to_string(),
                source: e,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        debug!(url = %url, bytes = written, "Fetched");
        Ok(written)
    }
}
