//! Admin endpoints for the project catalog and its credentials.

use crate::{CreateProject, Credential, Project, Projects, ProjectsError, UpdateProject};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::api_handler;
use vhub_domain::constants::PROJECTS_TAG;
use vhub_domain::pagination::PageRequest;
use vhub_kernel::server::error::error_response;
use vhub_kernel::server::page::Paginated;
use vhub_kernel::server::state::ApiState;

impl IntoResponse for ProjectsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Database { .. } | Self::Internal { .. } => {
                tracing::error!("Projects failure: {self}");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Projects feature failed",
                );
            },
        };
        error_response(status, self.to_string())
    }
}

pub fn admin_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(create_project, list_projects))
        .routes(routes!(get_project, update_project, delete_project))
        .routes(routes!(create_credential, list_credentials))
        .routes(routes!(activate_credential))
        .routes(routes!(deactivate_credential))
        .routes(routes!(delete_credential))
}

fn slice(state: &ApiState) -> Result<&Projects, ProjectsError> {
    state.try_get_slice::<Projects>().map_err(|err| ProjectsError::Internal {
        message: err.to_string().into(),
        context: None,
    })
}

#[api_handler(
    post,
    path = "/admin/projects",
    request_body = CreateProject,
    responses(
        (status = OK, description = "Project created", body = Project),
        (status = BAD_REQUEST, description = "Empty name or malformed website URL"),
    ),
    tag = PROJECTS_TAG,
)]
async fn create_project(
    State(state): State<ApiState>,
    Json(request): Json<CreateProject>,
) -> Result<Json<Project>, ProjectsError> {
    Ok(Json(slice(&state)?.create_project(request).await?))
}

#[api_handler(
    get,
    path = "/admin/projects",
    params(
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses((status = OK, description = "Newest-first page of projects", body = Paginated<Project>)),
    tag = PROJECTS_TAG,
)]
async fn list_projects(
    State(state): State<ApiState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paginated<Project>>, ProjectsError> {
    let (projects, total) = slice(&state)?.list_projects(page).await?;
    Ok(Json(Paginated::new(projects, page, total)))
}

#[api_handler(
    get,
    path = "/admin/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "Project details", body = Project),
        (status = NOT_FOUND, description = "Unknown project"),
    ),
    tag = PROJECTS_TAG,
)]
async fn get_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ProjectsError> {
    Ok(Json(slice(&state)?.get_project(&id).await?))
}

#[api_handler(
    put,
    path = "/admin/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProject,
    responses(
        (status = OK, description = "Updated project", body = Project),
        (status = NOT_FOUND, description = "Unknown project"),
    ),
    tag = PROJECTS_TAG,
)]
async fn update_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProject>,
) -> Result<Json<Project>, ProjectsError> {
    Ok(Json(slice(&state)?.update_project(&id, request).await?))
}

#[api_handler(
    delete,
    path = "/admin/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = NO_CONTENT, description = "Project and its credentials removed"),
        (status = NOT_FOUND, description = "Unknown project"),
    ),
    tag = PROJECTS_TAG,
)]
async fn delete_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ProjectsError> {
    slice(&state)?.delete_project(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/admin/projects/{id}/credentials",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "Freshly issued credential", body = Credential),
        (status = NOT_FOUND, description = "Unknown project"),
    ),
    tag = PROJECTS_TAG,
)]
async fn create_credential(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Credential>, ProjectsError> {
    Ok(Json(slice(&state)?.create_credential(&id).await?))
}

#[api_handler(
    get,
    path = "/admin/projects/{id}/credentials",
    params(
        ("id" = String, Path, description = "Project id"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page, capped at 100"),
    ),
    responses((status = OK, description = "Newest-first page of credentials", body = Paginated<Credential>)),
    tag = PROJECTS_TAG,
)]
async fn list_credentials(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paginated<Credential>>, ProjectsError> {
    let (credentials, total) = slice(&state)?.list_credentials(&id, page).await?;
    Ok(Json(Paginated::new(credentials, page, total)))
}

#[api_handler(
    post,
    path = "/admin/credentials/{id}/activate",
    params(("id" = String, Path, description = "Credential id")),
    responses(
        (status = OK, description = "Credential reactivated", body = Credential),
        (status = NOT_FOUND, description = "Unknown credential"),
    ),
    tag = PROJECTS_TAG,
)]
async fn activate_credential(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Credential>, ProjectsError> {
    Ok(Json(slice(&state)?.set_credential_active(&id, true).await?))
}

#[api_handler(
    post,
    path = "/admin/credentials/{id}/deactivate",
    params(("id" = String, Path, description = "Credential id")),
    responses(
        (status = OK, description = "Credential deactivated", body = Credential),
        (status = NOT_FOUND, description = "Unknown credential"),
    ),
    tag = PROJECTS_TAG,
)]
async fn deactivate_credential(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Credential>, ProjectsError> {
    Ok(Json(slice(&state)?.set_credential_active(&id, false).await?))
}

#[api_handler(
    delete,
    path = "/admin/credentials/{id}",
    params(("id" = String, Path, description = "Credential id")),
    responses(
        (status = NO_CONTENT, description = "Credential removed"),
        (status = NOT_FOUND, description = "Unknown credential"),
    ),
    tag = PROJECTS_TAG,
)]
async fn delete_credential(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ProjectsError> {
    slice(&state)?.delete_credential(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
