//! Admin login endpoint and the session middleware guarding admin routes.

use super::error::error_response;
use super::state::ApiState;
use crate::security::session::{issue_session_token, verify_session_token};
use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::{api_handler, api_model};
use vhub_domain::constants::AUTH_TAG;

#[api_model]
/// Admin login request
struct LoginRequest {
    /// Admin account name
    username: String,
    /// Admin account password
    password: String,
}

#[api_model]
/// Session token issued on successful login
struct LoginResponse {
    /// Bearer token for subsequent admin requests
    token: String,
    /// Token lifetime in seconds
    expires_in: u64,
}

pub fn auth_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(login_handler))
}

#[api_handler(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Session token issued", body = LoginResponse),
        (status = UNAUTHORIZED, description = "Unknown account or wrong password"),
    ),
    tag = AUTH_TAG,
)]
async fn login_handler(
    State(state): State<ApiState>,
    Json(credentials): Json<LoginRequest>,
) -> Response {
    let admin = &state.config.security.admin;
    if credentials.username != admin.username || credentials.password != admin.password {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let session = &state.config.security.session;
    match issue_session_token(&session.secret, &credentials.username, session.ttl_seconds) {
        Ok(token) => Json(LoginResponse { token, expires_in: session.ttl_seconds }).into_response(),
        Err(err) => {
            error!("Failed to issue session token: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Could not issue session token")
        }
    }
}

/// Requires a valid `Bearer` session token on every request passing through.
pub async fn require_session(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing bearer token");
    };

    match verify_session_token(&state.config.security.session.secret, token) {
        Ok(_claims) => next.run(request).await,
        Err(err) => {
            debug!("Rejected session token: {err}");
            error_response(StatusCode::UNAUTHORIZED, "Invalid or expired session")
        }
    }
}

/// Extracts the raw token from an `Authorization: Bearer ...` header.
///
/// Shared with slices that carry their own credentials in the same header,
/// e.g. the artifact sync API.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}
