//! Share endpoints: public one-time redeem plus the admin create/info pair.

use crate::{RedeemedShare, Share, ShareCode, ShareError};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::{api_handler, api_model};
use vhub_domain::constants::SHARE_TAG;
use vhub_kernel::server::error::error_response;
use vhub_kernel::server::state::ApiState;

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => {
                tracing::error!("Share failure: {self}");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Share feature failed");
            },
        };
        error_response(status, self.to_string())
    }
}

/// Payload for creating a share code.
#[api_model]
struct CreateShareRequest {
    /// The token to hand over
    token: String,
}

/// Public redeem route.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(redeem_share))
}

pub fn admin_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(create_share)).routes(routes!(share_info))
}

fn slice(state: &ApiState) -> Result<&Share, ShareError> {
    state.try_get_slice::<Share>().map_err(|err| ShareError::Internal {
        message: err.to_string().into(),
        context: None,
    })
}

#[api_handler(
    get,
    path = "/share/{code}",
    params(("code" = String, Path, description = "Six-digit share code")),
    responses(
        (status = OK, description = "Token handed over; the code is consumed", body = RedeemedShare),
        (status = NOT_FOUND, description = "Unknown, expired or already redeemed code"),
    ),
    tag = SHARE_TAG,
)]
async fn redeem_share(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> Result<Json<RedeemedShare>, ShareError> {
    Ok(Json(slice(&state)?.redeem(&code)?))
}

#[api_handler(
    post,
    path = "/admin/share",
    request_body = CreateShareRequest,
    responses(
        (status = OK, description = "Share code created", body = ShareCode),
        (status = BAD_REQUEST, description = "Empty token"),
    ),
    tag = SHARE_TAG,
)]
async fn create_share(
    State(state): State<ApiState>,
    Json(request): Json<CreateShareRequest>,
) -> Result<Json<ShareCode>, ShareError> {
    Ok(Json(slice(&state)?.create(request.token)?))
}

#[api_handler(
    get,
    path = "/admin/share/{code}",
    params(("code" = String, Path, description = "Six-digit share code")),
    responses(
        (status = OK, description = "Code metadata, not consumed", body = ShareCode),
        (status = NOT_FOUND, description = "Unknown or expired code"),
    ),
    tag = SHARE_TAG,
)]
async fn share_info(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> Result<Json<ShareCode>, ShareError> {
    Ok(Json(slice(&state)?.info(&code)?))
}
