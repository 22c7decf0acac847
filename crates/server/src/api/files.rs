//! Serving stored objects.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use depot_core::StoreError;

use crate::metrics::FILES_SENT;
use crate::state::AppState;

/// Stream `files/<digest>/<filename>` to the client.
///
/// Downloaded objects are stored under their percent-encoded URL, so the
/// raw path segment is tried when the decoded name is not found.
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path((digest, filename)): Path<(String, String)>,
    uri: Uri,
) -> Response {
    let raw_name = raw_last_segment(&uri);

    let mut result = state.store().get(&digest, &filename).await;
    let missing = matches!(&result, Err(e) if e.is_not_found());
    if let Some(raw) = raw_name.filter(|raw| missing && *raw != filename) {
        result = state.store().get(&digest, raw).await;
    }

    match result {
        Ok(stored) => {
            debug!(digest = %digest, filename = %filename, bytes = stored.len, "Serving file");
            FILES_SENT.inc();
            (
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/octet-stream"),
                    ),
                    (header::CONTENT_LENGTH, HeaderValue::from(stored.len)),
                ],
                Body::from_stream(ReaderStream::new(stored.file)),
            )
                .into_response()
        }
        Err(StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
        }
        Err(e) => {
            error!(digest = %digest, filename = %filename, error = %e, "Failed to open stored file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn raw_last_segment(uri: &Uri) -> Option<&str> {
    uri.path().trim_end_matches('/').rsplit('/').next()
}
