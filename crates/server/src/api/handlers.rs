use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use depot_core::SanitizedConfig;
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

const INDEX_HTML: &str = r#"<html><title>Depot</title><body>
  <h1>Upload a file</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input name="file" type="file" size="50">
    <br><br>
    <input type="submit" value="Upload" />
  </form>

  <hr>

  <h1>Download from an URL</h1>
  <form action="/download" method="post" novalidate>
    <input name="url" type="text" size="50">
    <br><br>
    <input type="submit" value="Download" />
  </form>
</body></html>
"#;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Landing page with the upload and download forms.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Prometheus scrape endpoint.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        encode_metrics(),
    )
}
