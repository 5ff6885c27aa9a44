//! Mapping of errors onto HTTP responses.
//!
//! Bodies are plain text; the dispatch office only ever sees these in a
//! browser tab.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::Error;

/// An error returned from a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request was malformed or failed validation.
    BadRequest(String),
    /// Something went wrong on our side.
    InternalServerError(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_validation_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            error!("Request failed: {err}");
            ApiError::InternalServerError(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::InternalServerError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}
