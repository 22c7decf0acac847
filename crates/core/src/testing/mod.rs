//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`Fetcher`](crate::fetch::Fetcher) so the
//! download pipeline can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use depot_core::testing::MockFetcher;
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! fetcher.set_body("http://example.com/a.bin", b"ABC".to_vec()).await;
//! fetcher.set_error("http://example.com/gone", 410).await;
//!
//! let pipeline = DownloadPipeline::new(store, jobs, fetcher.clone());
//! ```

mod mock_fetcher;

pub use mock_fetcher::{MockFetcher, MockResponse};
