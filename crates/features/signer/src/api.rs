//! Admin endpoints for signing projects, token issuance and verification.

use crate::{
    CreateSignerProject, CreateSignerToken, Signer, SignerError, SignerProject, SignerToken,
    UpdateSignerProject, VerifyTokenRequest, VerifyTokenResponse,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::{api_handler, api_model};
use vhub_domain::constants::SIGNER_TAG;
use vhub_domain::pagination::PageRequest;
use vhub_kernel::server::error::error_response;
use vhub_kernel::server::page::Paginated;
use vhub_kernel::server::state::ApiState;

impl IntoResponse for SignerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Token { .. } | Self::Database { .. } | Self::Internal { .. } => {
                tracing::error!("Signer failure: {self}");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Signer feature failed");
            },
        };
        error_response(status, self.to_string())
    }
}

/// How many expired tokens a sweep removed.
#[api_model]
struct SweepReport {
    removed: usize,
}

pub fn admin_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(create_signer_project, list_signer_projects))
        .routes(routes!(get_signer_project, update_signer_project, delete_signer_project))
        .routes(routes!(create_token, list_tokens))
        .routes(routes!(get_token, delete_token))
        .routes(routes!(activate_token))
        .routes(routes!(deactivate_token))
        .routes(routes!(delete_expired_tokens))
        .routes(routes!(verify_token))
}

fn slice(state: &ApiState) -> Result<&Signer, SignerError> {
    state.try_get_slice::<Signer>().map_err(|err| SignerError::Internal {
        message: err.to_string().into(),
        context: None,
    })
}

#[api_handler(
    post,
    path = "/admin/signer/projects",
    request_body = CreateSignerProject,
    responses(
        (status = OK, description = "Signing project created", body = SignerProject),
        (status = BAD_REQUEST, description = "Empty name or invalid key material"),
    ),
    tag = SIGNER_TAG,
)]
async fn create_signer_project(
    State(state): State<ApiState>,
    Json(request): Json<CreateSignerProject>,
) -> Result<Json<SignerProject>, SignerError> {
    Ok(Json(slice(&state)?.create_project(request).await?))
}

#[api_handler(
    get,
    path = "/admin/signer/projects",
    params(
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses((status = OK, description = "Newest-first page of signing projects", body = Paginated<SignerProject>)),
    tag = SIGNER_TAG,
)]
async fn list_signer_projects(
    State(state): State<ApiState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paginated<SignerProject>>, SignerError> {
    let (projects, total) = slice(&state)?.list_projects(page).await?;
    Ok(Json(Paginated::new(projects, page, total)))
}

#[api_handler(
    get,
    path = "/admin/signer/projects/{id}",
    params(("id" = String, Path, description = "Signing project id")),
    responses(
        (status = OK, description = "Signing project details", body = SignerProject),
        (status = NOT_FOUND, description = "Unknown signing project"),
    ),
    tag = SIGNER_TAG,
)]
async fn get_signer_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SignerProject>, SignerError> {
    Ok(Json(slice(&state)?.get_project(&id).await?))
}

#[api_handler(
    put,
    path = "/admin/signer/projects/{id}",
    params(("id" = String, Path, description = "Signing project id")),
    request_body = UpdateSignerProject,
    responses(
        (status = OK, description = "Updated signing project", body = SignerProject),
        (status = NOT_FOUND, description = "Unknown signing project"),
    ),
    tag = SIGNER_TAG,
)]
async fn update_signer_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSignerProject>,
) -> Result<Json<SignerProject>, SignerError> {
    Ok(Json(slice(&state)?.update_project(&id, request).await?))
}

#[api_handler(
    delete,
    path = "/admin/signer/projects/{id}",
    params(("id" = String, Path, description = "Signing project id")),
    responses(
        (status = NO_CONTENT, description = "Project and its tokens removed"),
        (status = NOT_FOUND, description = "Unknown signing project"),
    ),
    tag = SIGNER_TAG,
)]
async fn delete_signer_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, SignerError> {
    slice(&state)?.delete_project(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/admin/signer/projects/{id}/tokens",
    params(("id" = String, Path, description = "Signing project id")),
    request_body = CreateSignerToken,
    responses(
        (status = OK, description = "Token signed and recorded", body = SignerToken),
        (status = BAD_REQUEST, description = "Unparsable or past expiry"),
        (status = NOT_FOUND, description = "Unknown signing project"),
    ),
    tag = SIGNER_TAG,
)]
async fn create_token(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<CreateSignerToken>,
) -> Result<Json<SignerToken>, SignerError> {
    Ok(Json(slice(&state)?.create_token(&id, request).await?))
}

#[api_handler(
    get,
    path = "/admin/signer/projects/{id}/tokens",
    params(
        ("id" = String, Path, description = "Signing project id"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses((status = OK, description = "Newest-first page of tokens", body = Paginated<SignerToken>)),
    tag = SIGNER_TAG,
)]
async fn list_tokens(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paginated<SignerToken>>, SignerError> {
    let (tokens, total) = slice(&state)?.list_tokens(&id, page).await?;
    Ok(Json(Paginated::new(tokens, page, total)))
}

#[api_handler(
    get,
    path = "/admin/signer/tokens/{id}",
    params(("id" = String, Path, description = "Token id")),
    responses(
        (status = OK, description = "Token record", body = SignerToken),
        (status = NOT_FOUND, description = "Unknown token"),
    ),
    tag = SIGNER_TAG,
)]
async fn get_token(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SignerToken>, SignerError> {
    Ok(Json(slice(&state)?.get_token(&id).await?))
}

#[api_handler(
    post,
    path = "/admin/signer/tokens/{id}/activate",
    params(("id" = String, Path, description = "Token id")),
    responses(
        (status = OK, description = "Token reactivated", body = SignerToken),
        (status = NOT_FOUND, description = "Unknown token"),
    ),
    tag = SIGNER_TAG,
)]
async fn activate_token(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SignerToken>, SignerError> {
    Ok(Json(slice(&state)?.set_token_active(&id, true).await?))
}

#[api_handler(
    post,
    path = "/admin/signer/tokens/{id}/deactivate",
    params(("id" = String, Path, description = "Token id")),
    responses(
        (status = OK, description = "Token revoked", body = SignerToken),
        (status = NOT_FOUND, description = "Unknown token"),
    ),
    tag = SIGNER_TAG,
)]
async fn deactivate_token(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SignerToken>, SignerError> {
    Ok(Json(slice(&state)?.set_token_active(&id, false).await?))
}

#[api_handler(
    delete,
    path = "/admin/signer/tokens/{id}",
    params(("id" = String, Path, description = "Token id")),
    responses(
        (status = NO_CONTENT, description = "Token record removed"),
        (status = NOT_FOUND, description = "Unknown token"),
    ),
    tag = SIGNER_TAG,
)]
async fn delete_token(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, SignerError> {
    slice(&state)?.delete_token(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    delete,
    path = "/admin/signer/tokens/expired",
    responses((status = OK, description = "Expired tokens swept", body = SweepReport)),
    tag = SIGNER_TAG,
)]
async fn delete_expired_tokens(
    State(state): State<ApiState>,
) -> Result<Json<SweepReport>, SignerError> {
    let removed = slice(&state)?.delete_expired().await?;
    Ok(Json(SweepReport { removed }))
}

#[api_handler(
    post,
    path = "/admin/signer/verify",
    request_body = VerifyTokenRequest,
    responses(
        (status = OK, description = "Verification verdict with the claims on record", body = VerifyTokenResponse),
        (status = NOT_FOUND, description = "The token was never issued here"),
    ),
    tag = SIGNER_TAG,
)]
async fn verify_token(
    State(state): State<ApiState>,
    Json(request): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, SignerError> {
    Ok(Json(slice(&state)?.verify(&request.token).await?))
}
