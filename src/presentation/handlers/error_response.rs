use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ErrorKind;

/// Client closed the request before a response was produced.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::UpstreamUnavailable | ErrorKind::UpstreamRejected => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::Cancelled => {
            StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
        }
        ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::HandlerNotFound | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(kind: ErrorKind, message: impl Into<String>) -> Response {
    (
        status_for(kind),
        Json(ErrorResponse {
            code: kind.as_code().to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}
