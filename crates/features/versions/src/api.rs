//! Sync endpoints (credential bearer auth) and the versions admin surface.
//!
//! Sync reads treat a foreign or invalid token as not-found so the existence
//! of another project's artifacts is never confirmed; only the upload path
//! answers with unauthorized.

use crate::{ArtifactSelector, ArtifactVersion, UploadOutcome, Versions, VersionsError};
use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::api_handler;
use vhub_domain::constants::VERSIONS_TAG;
use vhub_domain::pagination::PageRequest;
use vhub_kernel::server::auth::bearer_token;
use vhub_kernel::server::error::error_response;
use vhub_kernel::server::page::Paginated;
use vhub_kernel::server::state::ApiState;
use vhub_projects::Projects;

impl IntoResponse for VersionsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database { .. } | Self::Storage { .. } | Self::Internal { .. } => {
                tracing::error!("Versions failure: {self}");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Versions feature failed",
                );
            },
        };
        error_response(status, self.to_string())
    }
}

/// Public artifact sync routes, capped at the configured upload size.
pub fn sync_router(max_artifact_bytes: usize) -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(upload_artifact))
        .routes(routes!(download_latest))
        .routes(routes!(download_by_hash))
        .routes(routes!(list_versions))
        .routes(routes!(latest_info))
        .routes(routes!(hash_info))
        .layer(DefaultBodyLimit::max(max_artifact_bytes))
}

pub fn admin_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(delete_version))
        .routes(routes!(promote_version))
        .routes(routes!(admin_list_versions))
}

fn slice(state: &ApiState) -> Result<&Versions, VersionsError> {
    state.try_get_slice::<Versions>().map_err(|err| VersionsError::Internal {
        message: err.to_string().into(),
        context: None,
    })
}

/// Checks the bearer credential token against the addressed project.
async fn authenticate(
    state: &ApiState,
    project_id: &str,
    headers: &HeaderMap,
) -> Result<(), VersionsError> {
    let token = bearer_token(headers).ok_or_else(|| VersionsError::Unauthorized {
        message: "Missing bearer token".into(),
        context: None,
    })?;

    let projects = state.try_get_slice::<Projects>().map_err(|err| VersionsError::Internal {
        message: err.to_string().into(),
        context: None,
    })?;

    projects.authenticate(project_id, token).await?;
    Ok(())
}

/// Same check, but reads hide the rejection behind not-found.
async fn authenticate_opaque(
    state: &ApiState,
    project_id: &str,
    headers: &HeaderMap,
) -> Result<(), VersionsError> {
    authenticate(state, project_id, headers).await.map_err(|err| match err {
        VersionsError::Unauthorized { .. } => VersionsError::NotFound {
            message: project_id.to_owned().into(),
            context: None,
        },
        other => other,
    })
}

fn attachment(download: crate::ArtifactDownload) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", download.version.file_name);
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

#[api_handler(
    post,
    path = "/sync/{project_id}",
    params(("project_id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "Version registered as latest", body = ArtifactVersion),
        (status = CONFLICT, description = "Project already has this content", body = ArtifactVersion),
        (status = UNAUTHORIZED, description = "Missing or invalid credential token"),
        (status = PAYLOAD_TOO_LARGE, description = "Artifact exceeds the size cap"),
    ),
    tag = VERSIONS_TAG,
)]
async fn upload_artifact(
    State(state): State<ApiState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, VersionsError> {
    authenticate(&state, &project_id, &headers).await?;

    let mut file_name = None;
    let mut bytes = None;
    let mut description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("database") => {
                file_name = field.file_name().map(ToOwned::to_owned);
                bytes = Some(field.bytes().await.map_err(bad_multipart)?);
            },
            Some("description") => {
                description = field.text().await.map_err(bad_multipart)?;
            },
            _ => {},
        }
    }

    let bytes = bytes.ok_or_else(|| VersionsError::Validation {
        message: "Missing `database` file field".into(),
        context: None,
    })?;
    let file_name = file_name.ok_or_else(|| VersionsError::Validation {
        message: "Missing file name on the `database` field".into(),
        context: None,
    })?;

    match slice(&state)?.upload(&project_id, &file_name, description, &bytes).await? {
        UploadOutcome::Created(version) => Ok(Json(version).into_response()),
        UploadOutcome::Duplicate(existing) => {
            Ok((StatusCode::CONFLICT, Json(existing)).into_response())
        },
    }
}

#[api_handler(
    get,
    path = "/sync/{project_id}/latest",
    params(("project_id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "Latest artifact bytes", content_type = "application/octet-stream"),
        (status = NOT_FOUND, description = "No versions, or the token does not match the project"),
    ),
    tag = VERSIONS_TAG,
)]
async fn download_latest(
    State(state): State<ApiState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, VersionsError> {
    authenticate_opaque(&state, &project_id, &headers).await?;

    let download = slice(&state)?.download(&project_id, ArtifactSelector::Latest).await?;
    Ok(attachment(download))
}

#[api_handler(
    get,
    path = "/sync/{project_id}/{hash}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("hash" = String, Path, description = "SHA-256 of the artifact"),
    ),
    responses(
        (status = OK, description = "Artifact bytes", content_type = "application/octet-stream"),
        (status = NOT_FOUND, description = "Unknown hash, or the token does not match the project"),
    ),
    tag = VERSIONS_TAG,
)]
async fn download_by_hash(
    State(state): State<ApiState>,
    Path((project_id, hash)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, VersionsError> {
    authenticate_opaque(&state, &project_id, &headers).await?;

    let download = slice(&state)?.download(&project_id, ArtifactSelector::Hash(&hash)).await?;
    Ok(attachment(download))
}

#[api_handler(
    get,
    path = "/sync/{project_id}/versions",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses(
        (status = OK, description = "Newest-first page of versions", body = Paginated<ArtifactVersion>),
        (status = NOT_FOUND, description = "The token does not match the project"),
    ),
    tag = VERSIONS_TAG,
)]
async fn list_versions(
    State(state): State<ApiState>,
    Path(project_id): Path<String>,
    Query(page): Query<PageRequest>,
    headers: HeaderMap,
) -> Result<Json<Paginated<ArtifactVersion>>, VersionsError> {
    authenticate_opaque(&state, &project_id, &headers).await?;

    let (versions, total) = slice(&state)?.list(&project_id, page).await?;
    Ok(Json(Paginated::new(versions, page, total)))
}

#[api_handler(
    get,
    path = "/sync/{project_id}/info/latest",
    params(("project_id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "Latest version metadata", body = ArtifactVersion),
        (status = NOT_FOUND, description = "No versions, or the token does not match the project"),
    ),
    tag = VERSIONS_TAG,
)]
async fn latest_info(
    State(state): State<ApiState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ArtifactVersion>, VersionsError> {
    authenticate_opaque(&state, &project_id, &headers).await?;

    Ok(Json(slice(&state)?.info(&project_id, ArtifactSelector::Latest).await?))
}

#[api_handler(
    get,
    path = "/sync/{project_id}/info/{hash}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("hash" = String, Path, description = "SHA-256 of the artifact"),
    ),
    responses(
        (status = OK, description = "Version metadata", body = ArtifactVersion),
        (status = NOT_FOUND, description = "Unknown hash, or the token does not match the project"),
    ),
    tag = VERSIONS_TAG,
)]
async fn hash_info(
    State(state): State<ApiState>,
    Path((project_id, hash)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ArtifactVersion>, VersionsError> {
    authenticate_opaque(&state, &project_id, &headers).await?;

    Ok(Json(slice(&state)?.info(&project_id, ArtifactSelector::Hash(&hash)).await?))
}

#[api_handler(
    get,
    path = "/admin/projects/{id}/versions",
    params(
        ("id" = String, Path, description = "Project id"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses((status = OK, description = "Newest-first page of versions", body = Paginated<ArtifactVersion>)),
    tag = VERSIONS_TAG,
)]
async fn admin_list_versions(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paginated<ArtifactVersion>>, VersionsError> {
    let (versions, total) = slice(&state)?.list(&id, page).await?;
    Ok(Json(Paginated::new(versions, page, total)))
}

#[api_handler(
    delete,
    path = "/admin/versions/{id}",
    params(("id" = String, Path, description = "Version id")),
    responses(
        (status = NO_CONTENT, description = "Version and its blob removed"),
        (status = NOT_FOUND, description = "Unknown version"),
    ),
    tag = VERSIONS_TAG,
)]
async fn delete_version(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, VersionsError> {
    slice(&state)?.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/admin/versions/{id}/latest",
    params(("id" = String, Path, description = "Version id")),
    responses(
        (status = OK, description = "Version promoted to latest", body = ArtifactVersion),
        (status = NOT_FOUND, description = "Unknown version"),
    ),
    tag = VERSIONS_TAG,
)]
async fn promote_version(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactVersion>, VersionsError> {
    Ok(Json(slice(&state)?.set_latest(&id).await?))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> VersionsError {
    VersionsError::Validation { message: err.to_string().into(), context: None }
}
