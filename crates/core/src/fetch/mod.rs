//! Outbound fetching of submitted URLs.
//!
//! The pipeline only depends on the [`Fetcher`] trait; [`HttpFetcher`] is the
//! reqwest implementation used by the server, and tests substitute
//! `testing::MockFetcher`.

mod error;
mod http;
mod traits;

pub use error::FetchError;
pub use http::HttpFetcher;
pub use traits::Fetcher;
