//! Direct upload handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
};
use tracing::{error, info};

use depot_core::StoreError;

use super::middleware::AuthUser;
use crate::metrics::{UPLOADS_ACTIVE, UPLOADS_TOTAL};
use crate::state::AppState;

/// Holds `uploads active` up for the lifetime of one request.
struct ActiveUpload;

impl ActiveUpload {
    fn start() -> Self {
        UPLOADS_ACTIVE.inc();
        Self
    }
}

impl Drop for ActiveUpload {
    fn drop(&mut self) {
        UPLOADS_ACTIVE.dec();
    }
}

/// Store the multipart `file` field and answer with its public URL.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<String, (StatusCode, String)> {
    let _active = ActiveUpload::start();

    let (filename, data) = loop {
        let field = multipart.next_field().await.map_err(|e| {
            (
                e.status(),
                format!("Problem when getting file: {}\n", e.body_text()),
            )
        })?;
        let Some(field) = field else {
            return Err((
                StatusCode::BAD_REQUEST,
                "Problem when getting file: missing file field\n".to_string(),
            ));
        };
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(basename).unwrap_or_default();
        let data = field.bytes().await.map_err(|e| {
            (
                e.status(),
                format!("Problem when reading: {}\n", e.body_text()),
            )
        })?;
        break (filename, data);
    };

    info!(user = %user, filename = %filename, bytes = data.len(), "Receiving file");

    let stored = state.store().put(&data, &filename).await.map_err(|e| match e {
        StoreError::InvalidName(_) => (
            StatusCode::BAD_REQUEST,
            format!("Problem when writing file: {}\n", e),
        ),
        e => {
            error!(filename = %filename, error = %e, "Failed to store upload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Problem when writing file: {}\n", e),
            )
        }
    })?;

    UPLOADS_TOTAL.inc();
    info!(path = %stored.public_path, "Saved file");

    let proto = header_str(&headers, "x-forwarded-proto").unwrap_or("http");
    let host = header_str(&headers, header::HOST.as_str()).unwrap_or("localhost");
    Ok(format!("{}://{}/{}\n", proto, host, stored.public_path))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Drop any client-side directory components.
fn basename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}
