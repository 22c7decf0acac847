//! Remote download submission and job status handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use depot_core::{JobReport, QueryError};

use crate::state::AppState;

/// Tells clients whether a `200` status body belongs to a running, a
/// failed or an unknown job.
pub const JOB_STATE_HEADER: HeaderName = HeaderName::from_static("x-depot-job-state");

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
}

/// Start fetching `url` in the background and send the client to its
/// status page.
pub async fn submit_download(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DownloadForm>,
) -> Response {
    match state.pipeline().submit(&form.url).await {
        Ok(handle) => {
            info!(job_id = %handle.id(), "Redirecting to job status");
            Redirect::to(&format!("/loading/{}", handle.id())).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rejected download submission");
            (StatusCode::BAD_REQUEST, format!("can not parse url: {}\n", e)).into_response()
        }
    }
}

/// Redirect to the stored file once done, otherwise show the job log.
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.status().lookup(&id).await {
        Ok(JobReport::Done { location }) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, format!("/{}", location))],
        )
            .into_response(),
        Ok(JobReport::InProgress { log }) => log_response("running", log),
        Ok(JobReport::Failed { log, .. }) => log_response("failed", log),
        // Reported inline, like any other log read
        Err(QueryError::NotFound(id)) => {
            warn!(job_id = %id, "can not open logfile");
            log_response("unknown", format!("can not open logfile: no job {}\n", id))
        }
        Err(QueryError::Store(e)) => {
            error!(job_id = %id, error = %e, "Failed to read job status");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", e)).into_response()
        }
    }
}

fn log_response(job_state: &'static str, log: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (JOB_STATE_HEADER, job_state),
        ],
        log,
    )
        .into_response()
}
