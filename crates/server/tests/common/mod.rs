//! Common test utilities for in-process HTTP testing with mocks.
//!
//! This module provides a test fixture that builds the full router around a
//! temporary store and a [`MockFetcher`], so upload, download and status
//! flows can be exercised without network access.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use depot_core::config::{AuthConfig, Config, FetchConfig, ServerConfig, StorageConfig};
use depot_core::testing::MockFetcher;
use depot_server::state::AppState;

pub const MULTIPART_BOUNDARY: &str = "depot-test-boundary";

/// Test fixture for in-process router testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.upload("a.txt", b"ABC", &[("host", "depot.test")]).await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock fetcher - configure remote bodies
    pub fetcher: Arc<MockFetcher>,
    /// Temporary directory holding the store
    pub temp_dir: TempDir,
}

/// Options for building a fixture.
pub struct TestConfig {
    pub auth: AuthConfig,
    pub max_upload_bytes: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::none(),
            max_upload_bytes: StorageConfig::default().max_upload_bytes,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture without authentication.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fetcher = Arc::new(MockFetcher::new());

        let config = Config {
            auth: test_config.auth,
            server: ServerConfig {
                port: 0, // Not used for in-process testing
                ..ServerConfig::default()
            },
            storage: StorageConfig {
                root: temp_dir.path().join("files"),
                max_upload_bytes: test_config.max_upload_bytes,
            },
            fetch: FetchConfig::default(),
        };

        let state = Arc::new(
            AppState::with_fetcher(config, Arc::clone(&fetcher) as Arc<dyn depot_core::Fetcher>)
                .expect("Failed to create app state"),
        );
        let router = depot_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            fetcher,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let request = with_headers(Request::builder().method("GET").uri(path), headers)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Submit a URL through the download form.
    pub async fn submit_download(&self, url: &str, headers: &[(&str, &str)]) -> TestResponse {
        let body = format!("url={}", urlencode(url));
        let request = with_headers(
            Request::builder()
                .method("POST")
                .uri("/download")
                .header("content-type", "application/x-www-form-urlencoded"),
            headers,
        )
        .body(Body::from(body))
        .unwrap();
        self.send(request).await
    }

    /// Upload `data` as the multipart `file` field.
    pub async fn upload(
        &self,
        filename: &str,
        data: &[u8],
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.upload_to("/upload", "file", filename, data, headers)
            .await
    }

    /// Upload with full control over the route and field name.
    pub async fn upload_to(
        &self,
        path: &str,
        field: &str,
        filename: &str,
        data: &[u8],
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let request = with_headers(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
                ),
            headers,
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .unwrap();
        self.send(request).await
    }

    /// Poll the status page until the job is no longer running.
    pub async fn wait_for_job(&self, id: &str) -> TestResponse {
        let path = format!("/loading/{}", id);
        for _ in 0..200 {
            let response = self.get(&path).await;
            if response.header("x-depot-job-state") != Some("running") {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish in time", id);
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn with_headers(
    mut builder: axum::http::request::Builder,
    headers: &[(&str, &str)],
) -> axum::http::request::Builder {
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
}

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = MULTIPART_BOUNDARY,
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Minimal form encoding for test URLs.
fn urlencode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Job id from a `/loading/<id>` redirect.
pub fn job_id_from_location(response: &TestResponse) -> String {
    let location = response.header("location").expect("missing Location header");
    location
        .strip_prefix("/loading/")
        .expect("unexpected redirect target")
        .to_string()
}
