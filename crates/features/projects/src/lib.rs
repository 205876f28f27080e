//! # Project catalog
//!
//! Owns the project registry and the sync credentials that authorize the
//! artifact sync API. Other slices never read the `project`/`credential`
//! tables directly: they authenticate tokens through [`Projects::authenticate`]
//! and learn about removals over the event bus ([`ProjectDeleted`]).
//!
//! Token lookups go through a bounded TTL cache, so the cache TTL bounds how
//! long a freshly revoked credential may still be honored.

mod error;
mod model;
mod repository;

#[cfg(feature = "server")]
pub mod api;

pub use crate::error::{ProjectsError, ProjectsErrorExt};
pub use crate::model::{CreateProject, Credential, Project, UpdateProject};

use crate::repository::ProjectRepository;
use moka::sync::Cache;
use std::time::Duration;
use tracing::{debug, info};
use vhub_database::Database;
use vhub_domain::config::AppConfig;
use vhub_domain::events::ProjectDeleted;
use vhub_domain::pagination::PageRequest;
use vhub_event_bus::EventBus;
use vhub_kernel::domain::registry::InitializedSlice;
use vhub_kernel::security::ids::{generate_project_id, is_valid_credential_token, is_valid_project_id};

/// Projects feature state
#[vhub_derive::vhub_slice]
pub struct Projects {
    repository: ProjectRepository,
    events: EventBus,
    /// Raw token -> active credential; negative results are cached too.
    token_cache: Cache<String, Option<Credential>>,
}

/// Initialize the projects feature.
///
/// # Errors
/// Never fails today; the signature leaves room for config validation.
pub fn init(
    config: &AppConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, ProjectsError> {
    let cache_cfg = &config.security.token_cache;
    let token_cache = Cache::builder()
        .max_capacity(cache_cfg.capacity)
        .time_to_live(Duration::from_secs(cache_cfg.ttl_seconds))
        .build();

    let inner = ProjectsInner {
        repository: ProjectRepository::new(database.clone()),
        events: events.clone(),
        token_cache,
    };

    info!("Projects server slice initialized");

    Ok(InitializedSlice::new(Projects::new(inner)))
}

impl Projects {
    /// Creates a project with a freshly generated public id.
    ///
    /// # Errors
    /// Returns [`ProjectsError::Validation`] on an empty name or a malformed
    /// website URL.
    pub async fn create_project(&self, request: CreateProject) -> Result<Project, ProjectsError> {
        validate_name(&request.name)?;
        validate_website(&request.website)?;

        self.repository
            .create_project(generate_project_id(), request.name, request.description, request.website)
            .await
    }

    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown id.
    pub async fn get_project(&self, id: &str) -> Result<Project, ProjectsError> {
        self.repository.get_project(id).await?.ok_or_else(|| not_found(id))
    }

    /// Newest-first page of the project catalog.
    ///
    /// # Errors
    /// Returns [`ProjectsError::Database`] if the query fails.
    pub async fn list_projects(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<Project>, usize), ProjectsError> {
        self.repository.list_projects(page).await
    }

    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown id and
    /// [`ProjectsError::Validation`] on a malformed payload.
    pub async fn update_project(
        &self,
        id: &str,
        request: UpdateProject,
    ) -> Result<Project, ProjectsError> {
        validate_name(&request.name)?;
        validate_website(&request.website)?;
        self.get_project(id).await?;

        self.repository
            .update_project(id, request.name, request.description, request.website)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes a project and its credentials, then announces the deletion so
    /// dependent slices can purge their own records and blobs.
    ///
    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown id.
    pub async fn delete_project(&self, id: &str) -> Result<(), ProjectsError> {
        self.get_project(id).await?;
        self.repository.delete_project(id).await?;
        self.token_cache.invalidate_all();

        if let Err(err) = self.events.publish(ProjectDeleted { project_id: id.to_owned() }) {
            // The deletion itself committed; listeners will catch up on the
            // next startup sweep at worst.
            tracing::warn!("Failed to announce project deletion: {err}");
        }

        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    /// Issues a new active credential for `project_id`.
    ///
    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown project.
    pub async fn create_credential(&self, project_id: &str) -> Result<Credential, ProjectsError> {
        self.get_project(project_id).await?;
        self.repository.create_credential(project_id.to_owned()).await
    }

    /// # Errors
    /// Returns [`ProjectsError::Database`] if the query fails.
    pub async fn list_credentials(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Credential>, usize), ProjectsError> {
        self.repository.list_credentials(project_id, page).await
    }

    /// Activates or deactivates a credential and drops it from the token cache.
    ///
    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown credential.
    pub async fn set_credential_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<Credential, ProjectsError> {
        let credential =
            self.repository.get_credential(id).await?.ok_or_else(|| not_found(id))?;

        self.repository.set_credential_active(id, is_active).await?;
        self.token_cache.invalidate(&credential.token);

        self.repository.get_credential(id).await?.ok_or_else(|| not_found(id))
    }

    /// # Errors
    /// Returns [`ProjectsError::NotFound`] for an unknown credential.
    pub async fn delete_credential(&self, id: &str) -> Result<(), ProjectsError> {
        let credential =
            self.repository.get_credential(id).await?.ok_or_else(|| not_found(id))?;

        self.repository.delete_credential(id).await?;
        self.token_cache.invalidate(&credential.token);

        Ok(())
    }

    /// Authorizes a sync-API token for `project_id`.
    ///
    /// A token authorizes only if a credential with that exact token exists,
    /// is active, and belongs to the addressed project. Inactive or
    /// foreign-project tokens are rejected without revealing which case it was.
    ///
    /// # Errors
    /// Returns [`ProjectsError::Unauthorized`] on any rejection.
    pub async fn authenticate(
        &self,
        project_id: &str,
        token: &str,
    ) -> Result<Credential, ProjectsError> {
        if !is_valid_project_id(project_id) || !is_valid_credential_token(token) {
            return Err(unauthorized());
        }

        let credential = match self.token_cache.get(token) {
            Some(cached) => cached,
            None => {
                let loaded = self.repository.find_active_by_token(token).await?;
                self.token_cache.insert(token.to_owned(), loaded.clone());
                loaded
            },
        };

        match credential {
            Some(credential) if credential.project_id == project_id => Ok(credential),
            Some(_) => {
                debug!(project_id = %project_id, "Token belongs to another project");
                Err(unauthorized())
            },
            None => Err(unauthorized()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ProjectsError> {
    if name.trim().is_empty() {
        return Err(ProjectsError::Validation {
            message: "Project name must not be empty".into(),
            context: None,
        });
    }
    Ok(())
}

fn validate_website(website: &str) -> Result<(), ProjectsError> {
    if website.is_empty() || website.starts_with("http://") || website.starts_with("https://") {
        return Ok(());
    }
    Err(ProjectsError::Validation {
        message: "Website must be an http(s) URL".into(),
        context: None,
    })
}

fn not_found(id: &str) -> ProjectsError {
    ProjectsError::NotFound { message: id.to_owned().into(), context: None }
}

fn unauthorized() -> ProjectsError {
    ProjectsError::Unauthorized { message: "Invalid token or project".into(), context: None }
}
