//! Baseline routes every deployment carries: health plus admin login.

use super::state::ApiState;
use super::{auth, health};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(health::health_handler)).merge(auth::auth_router())
}
