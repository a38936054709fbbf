use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::application::queries::ExtractTextQuery;
use crate::application::{Classify, ErrorKind, RequestContext};
use crate::infrastructure::observability::RequestId;
use crate::presentation::auth::CallerIdentity;
use crate::presentation::handlers::error_response;
use crate::presentation::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub objectkey: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub text: String,
}

/// `Process(objectkey) -> text`.
#[tracing::instrument(skip_all, fields(request_id = %request_id.0))]
pub async fn process_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(CallerIdentity(claims)): Extension<CallerIdentity>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Process request body rejected");
            return error_response(ErrorKind::InvalidInput, rejection.body_text());
        }
    };
    let object_key = body.objectkey.trim();
    if object_key.is_empty() {
        tracing::warn!("Process request without object key");
        return error_response(ErrorKind::InvalidInput, "objectkey is required");
    }

    // Cancelled when this future is dropped, e.g. the client went away.
    let cancellation = CancellationToken::new();
    let _cancel_on_drop = cancellation.clone().drop_guard();

    let mut ctx = RequestContext::new()
        .with_cancellation(cancellation)
        .with_claims(claims)
        .with_request_id(request_id.0.clone());
    if let Some(timeout) = state.request_timeout {
        ctx = ctx.with_timeout(timeout);
    }

    match state.bus.ask(&ctx, ExtractTextQuery::new(object_key)).await {
        Ok(result) => (StatusCode::OK, Json(ProcessResponse { text: result.text })).into_response(),
        Err(e) => {
            let kind = e.kind();
            tracing::error!(error = %e, code = kind.as_code(), object_key, "Process failed");
            error_response(kind, e.to_string())
        }
    }
}
