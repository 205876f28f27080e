use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};
use vhub::features;
use vhub::kernel::prelude::ApiState;
use vhub::kernel::server::auth::require_session;

#[derive(OpenApi)]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let cfg = state.config.clone();
    let max_artifact_bytes = usize::try_from(cfg.storage.max_artifact_bytes).unwrap_or(usize::MAX);

    // Admin surface sits behind the session middleware; everything else is
    // authenticated per-route (sync credentials) or public (share redeem).
    let admin = OpenApiRouter::new()
        .merge(features::assets::api::router())
        .merge(features::projects::api::admin_router())
        .merge(features::versions::api::admin_router())
        .merge(features::signer::api::admin_router())
        .merge(features::share::api::admin_router())
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api = OpenApiRouter::new()
        .merge(vhub::server::router::system_router())
        .merge(features::share::api::router())
        .merge(features::versions::api::sync_router(max_artifact_bytes))
        .merge(admin);

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Merge all routes, then serve static assets for everything else
    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .fallback_service(ServeDir::new(&cfg.storage.static_dir))
}
