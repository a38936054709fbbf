use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::auth::{AuthGate, auth_middleware};
use crate::presentation::handlers::{health_handler, process_handler};
use crate::presentation::state::AppState;

pub const PROCESS_PATH: &str = "/ocr.v1.OcrService/Process";
pub const DEFAULT_HEALTH_PATH: &str = "/healthz";

/// RPC surface. The auth gate runs inside the request id layer so rejections carry the id.
pub fn create_router(state: AppState, gate: Arc<AuthGate>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(PROCESS_PATH, post(process_handler))
        .layer(middleware::from_fn_with_state(gate, auth_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}

/// Liveness listener, served on its own address.
pub fn create_health_router(path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Router::new()
        .route(&path, get(health_handler))
        .layer(TraceLayer::new_for_http())
}
