use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vhub_derive::api_model;

#[api_model]
/// Uniform error payload returned by every API endpoint.
pub struct ErrorBody {
    /// Human-readable failure description
    pub error: String,
}

/// Builds an error response with the uniform JSON body.
///
/// Feature slices call this from their `IntoResponse` impls so that
/// clients always see the same error shape.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}
