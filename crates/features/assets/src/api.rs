//! Read-only admin endpoint exposing the loaded stylesheet pipeline record.

use crate::{Assets, StylesheetConfig};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::api_handler;
use vhub_domain::constants::ASSETS_TAG;
use vhub_kernel::server::error::error_response;
use vhub_kernel::server::state::ApiState;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(get_stylesheet))
}

#[api_handler(
    get,
    path = "/admin/assets/stylesheet",
    responses(
        (status = OK, description = "Current stylesheet pipeline record", body = StylesheetConfig),
        (status = INTERNAL_SERVER_ERROR, description = "Assets slice not registered"),
    ),
    tag = ASSETS_TAG,
)]
async fn get_stylesheet(State(state): State<ApiState>) -> Response {
    match state.try_get_slice::<Assets>() {
        Ok(assets) => Json(assets.stylesheet.clone()).into_response(),
        Err(err) => {
            tracing::error!("Assets slice lookup failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Assets feature unavailable")
        }
    }
}
