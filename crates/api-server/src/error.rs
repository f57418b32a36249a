//! Mapping of core errors onto HTTP responses

use axum::{http::StatusCode, Json};
use serde::Serialize;

use planner_core::{Error, ErrorKind};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn api_error(e: Error) -> ApiError {
    let kind = e.kind();
    if kind == ErrorKind::Store {
        tracing::warn!("Store failure: {}", e);
    }
    (
        status_for(kind),
        Json(ErrorResponse {
            error: e.to_string(),
            kind: kind.as_str(),
        }),
    )
}
