//! # Artifact version registry
//!
//! Tracks the database artifacts clients sync per project. Bytes live in the
//! blob store under the project's namespace, keyed by their SHA-256; rows in
//! `artifact_version` carry the metadata and the `is_latest` flag.
//!
//! Credential checks stay with the projects slice; handlers authenticate the
//! bearer token there before calling in. Project deletions arrive over the
//! event bus and purge both the rows and the namespace.

mod error;
mod model;
mod repository;

#[cfg(feature = "server")]
pub mod api;

pub use crate::error::{VersionsError, VersionsErrorExt};
pub use crate::model::{ArtifactDownload, ArtifactVersion, UploadOutcome};

use crate::repository::VersionRepository;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use vhub_database::Database;
use vhub_domain::config::AppConfig;
use vhub_domain::events::ProjectDeleted;
use vhub_domain::pagination::PageRequest;
use vhub_event_bus::{EventBus, EventReceiverExt};
use vhub_kernel::domain::registry::InitializedSlice;
use vhub_kernel::safe_nanoid;
use vhub_kernel::time::utc_now;
use vhub_storage::Storage;

/// Addresses one version of a project's artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSelector<'a> {
    Latest,
    Hash(&'a str),
}

/// Versions feature state
#[vhub_derive::vhub_slice]
pub struct Versions {
    repository: VersionRepository,
    storage: Storage,
    max_artifact_bytes: usize,
}

/// Initialize the versions feature.
///
/// Spawns a background listener that purges a project's versions and its
/// storage namespace when the project is deleted.
///
/// # Errors
/// Returns [`VersionsError::Internal`] if the event bus refuses the
/// subscription.
pub fn init(
    config: &AppConfig,
    database: &Database,
    storage: &Storage,
    events: &EventBus,
) -> Result<InitializedSlice, VersionsError> {
    let slice = Versions::new(VersionsInner {
        repository: VersionRepository::new(database.clone()),
        storage: storage.clone(),
        max_artifact_bytes: usize::try_from(config.storage.max_artifact_bytes)
            .unwrap_or(usize::MAX),
    });

    let mut deletions = events
        .subscribe::<ProjectDeleted>()
        .map_err(|err| VersionsError::Internal { message: err.to_string().into(), context: None })?;

    let listener = slice.clone();
    tokio::spawn(async move {
        while let Some(event) = EventReceiverExt::recv(&mut deletions).await {
            if let Err(err) = listener.purge_project(&event.project_id).await {
                warn!(project_id = %event.project_id, "Failed to purge project artifacts: {err}");
            }
        }
    });

    info!("Versions server slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Versions {
    /// Registers an upload for `project_id`.
    ///
    /// The bytes are hashed first; a hash the project already has short-cuts
    /// to [`UploadOutcome::Duplicate`] with the existing record. Otherwise the
    /// blob is written before the row: if the insert then fails, the blob is
    /// removed again so storage never holds bytes without a record.
    ///
    /// # Errors
    /// Returns [`VersionsError::TooLarge`] above the configured cap and
    /// [`VersionsError::Validation`] on an empty payload or file name.
    pub async fn upload(
        &self,
        project_id: &str,
        file_name: &str,
        description: String,
        bytes: &[u8],
    ) -> Result<UploadOutcome, VersionsError> {
        if file_name.trim().is_empty() {
            return Err(VersionsError::Validation {
                message: "File name must not be empty".into(),
                context: None,
            });
        }
        if bytes.is_empty() {
            return Err(VersionsError::Validation {
                message: "Artifact must not be empty".into(),
                context: None,
            });
        }
        if bytes.len() > self.max_artifact_bytes {
            return Err(VersionsError::TooLarge {
                message: format!(
                    "{} bytes exceeds the {} byte limit",
                    bytes.len(),
                    self.max_artifact_bytes
                )
                .into(),
                context: None,
            });
        }

        let file_hash = hex::encode(Sha256::digest(bytes));
        if let Some(existing) = self.repository.find_by_hash(project_id, &file_hash).await? {
            return Ok(UploadOutcome::Duplicate(existing));
        }

        let namespace = self.storage.namespace(project_id)?;
        namespace.write(&file_hash, bytes).await?;

        let record = ArtifactVersion {
            id: safe_nanoid!(),
            project_id: project_id.to_owned(),
            version: Utc::now().timestamp().to_string(),
            file_hash: file_hash.clone(),
            file_name: file_name.to_owned(),
            file_size: bytes.len() as u64,
            storage_key: file_hash.clone(),
            description,
            is_latest: true,
            created_at: utc_now(),
        };

        if let Err(err) = self.repository.insert_as_latest(&record).await {
            if let Err(cleanup) = namespace.delete(&file_hash).await {
                warn!(project_id = %project_id, "Failed to roll back blob: {cleanup}");
            }
            return Err(err);
        }

        info!(project_id = %project_id, version = %record.version, "Artifact uploaded");
        Ok(UploadOutcome::Created(record))
    }

    /// Metadata for the selected version.
    ///
    /// # Errors
    /// Returns [`VersionsError::NotFound`] if the project has no matching
    /// version.
    pub async fn info(
        &self,
        project_id: &str,
        selector: ArtifactSelector<'_>,
    ) -> Result<ArtifactVersion, VersionsError> {
        let found = match selector {
            ArtifactSelector::Latest => self.repository.find_latest(project_id).await?,
            ArtifactSelector::Hash(hash) => {
                self.repository.find_by_hash(project_id, hash).await?
            },
        };

        found.ok_or_else(|| not_found(project_id))
    }

    /// Original bytes plus metadata for the selected version.
    ///
    /// # Errors
    /// Returns [`VersionsError::NotFound`] if the project has no matching
    /// version.
    pub async fn download(
        &self,
        project_id: &str,
        selector: ArtifactSelector<'_>,
    ) -> Result<ArtifactDownload, VersionsError> {
        let version = self.info(project_id, selector).await?;
        let bytes = self.storage.namespace(project_id)?.read(&version.storage_key).await?;

        Ok(ArtifactDownload { version, bytes })
    }

    /// Newest-first page of a project's versions.
    ///
    /// # Errors
    /// Returns [`VersionsError::Database`] if the query fails.
    pub async fn list(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<ArtifactVersion>, usize), VersionsError> {
        self.repository.list(project_id, page).await
    }

    /// Removes a version and its blob; a deleted latest hands the flag to the
    /// most recently created remaining version.
    ///
    /// # Errors
    /// Returns [`VersionsError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: &str) -> Result<(), VersionsError> {
        let record = self.repository.get(id).await?.ok_or_else(|| not_found(id))?;

        self.repository.delete_and_promote(&record).await?;

        let namespace = self.storage.namespace(record.project_id.as_str())?;
        if let Err(err) = namespace.delete(&record.storage_key).await {
            warn!(version_id = %id, "Failed to remove artifact blob: {err}");
        }

        info!(project_id = %record.project_id, version = %record.version, "Artifact deleted");
        Ok(())
    }

    /// Marks `id` the project's latest version, clearing the flag everywhere
    /// else.
    ///
    /// # Errors
    /// Returns [`VersionsError::NotFound`] for an unknown id.
    pub async fn set_latest(&self, id: &str) -> Result<ArtifactVersion, VersionsError> {
        let record = self.repository.get(id).await?.ok_or_else(|| not_found(id))?;

        self.repository.set_latest(id, &record.project_id).await?;
        self.repository.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Drops every version record and the whole storage namespace of a
    /// deleted project.
    ///
    /// # Errors
    /// Returns [`VersionsError::Database`] or [`VersionsError::Storage`] if
    /// either side of the purge fails.
    pub async fn purge_project(&self, project_id: &str) -> Result<(), VersionsError> {
        self.repository.delete_by_project(project_id).await?;
        self.storage.remove_namespace(project_id).await?;

        info!(project_id = %project_id, "Project artifacts purged");
        Ok(())
    }
}

fn not_found(what: &str) -> VersionsError {
    VersionsError::NotFound { message: what.to_owned().into(), context: None }
}
