use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{downloads, files, handlers, upload};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().storage.max_upload_bytes;

    // Submission routes, gated by the configured authenticator
    let protected_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(upload::upload_file))
        .route("/upload/", post(upload::upload_file))
        .route("/download", post(downloads::submit_download))
        .route("/download/", post(downloads::submit_download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // Stored files and job status are always public
    let public_routes = Router::new()
        .route("/files/{digest}/{filename}", get(files::serve_file))
        .route("/files/{digest}/{filename}/", get(files::serve_file))
        .route("/loading/{id}", get(downloads::job_status))
        .route("/loading/{id}/", get(downloads::job_status))
        .route("/metrics", get(handlers::metrics));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
