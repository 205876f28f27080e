//! `SurrealDB` queries for artifact versions.
//!
//! `created_at` is a fixed-width RFC 3339 string (see `vhub_kernel::time`),
//! so `ORDER BY created_at DESC` yields newest-first without parsing.

use crate::error::VersionsError;
use crate::model::ArtifactVersion;
use vhub_database::{Database, DatabaseErrorExt};
use vhub_domain::pagination::PageRequest;

const VERSION_FIELDS: &str = "id.id() AS id, project_id, version, file_hash, file_name, \
                              file_size, storage_key, description, is_latest, created_at";

#[derive(Debug, Clone)]
pub(crate) struct VersionRepository {
    db: Database,
}

impl VersionRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a new version as latest, clearing the flag on every other
    /// version of the project in the same transaction.
    pub(crate) async fn insert_as_latest(
        &self,
        record: &ArtifactVersion,
    ) -> Result<(), VersionsError> {
        self.db
            .query(
                "BEGIN TRANSACTION;
                UPDATE artifact_version SET is_latest = false
                    WHERE project_id = $project_id AND is_latest = true;
                CREATE type::thing('artifact_version', $id) CONTENT {
                    project_id: $project_id,
                    version: $version,
                    file_hash: $file_hash,
                    file_name: $file_name,
                    file_size: $file_size,
                    storage_key: $storage_key,
                    description: $description,
                    is_latest: true,
                    created_at: $created_at
                };
                COMMIT TRANSACTION;",
            )
            .bind(("id", record.id.clone()))
            .bind(("project_id", record.project_id.clone()))
            .bind(("version", record.version.clone()))
            .bind(("file_hash", record.file_hash.clone()))
            .bind(("file_name", record.file_name.clone()))
            .bind(("file_size", record.file_size))
            .bind(("storage_key", record.storage_key.clone()))
            .bind(("description", record.description.clone()))
            .bind(("created_at", record.created_at.clone()))
            .await
            .context("Inserting artifact version")?;

        Ok(())
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Option<ArtifactVersion>, VersionsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {VERSION_FIELDS} FROM type::thing('artifact_version', $id)"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading artifact version")?;

        Ok(response.take::<Vec<ArtifactVersion>>(0)?.into_iter().next())
    }

    pub(crate) async fn find_by_hash(
        &self,
        project_id: &str,
        file_hash: &str,
    ) -> Result<Option<ArtifactVersion>, VersionsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {VERSION_FIELDS} FROM artifact_version \
                 WHERE project_id = $project_id AND file_hash = $file_hash LIMIT 1"
            ))
            .bind(("project_id", project_id.to_owned()))
            .bind(("file_hash", file_hash.to_owned()))
            .await
            .context("Looking up artifact version by hash")?;

        Ok(response.take::<Vec<ArtifactVersion>>(0)?.into_iter().next())
    }

    pub(crate) async fn find_latest(
        &self,
        project_id: &str,
    ) -> Result<Option<ArtifactVersion>, VersionsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {VERSION_FIELDS} FROM artifact_version \
                 WHERE project_id = $project_id AND is_latest = true LIMIT 1"
            ))
            .bind(("project_id", project_id.to_owned()))
            .await
            .context("Looking up latest artifact version")?;

        Ok(response.take::<Vec<ArtifactVersion>>(0)?.into_iter().next())
    }

    pub(crate) async fn list(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<ArtifactVersion>, usize), VersionsError> {
        let clamped = page.clamped();
        let mut response = self
            .db
            .query(format!(
                "SELECT {VERSION_FIELDS} FROM artifact_version WHERE project_id = $project_id \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            ))
            .query(
                "(SELECT VALUE count() FROM artifact_version \
                 WHERE project_id = $project_id GROUP ALL)[0]",
            )
            .bind(("project_id", project_id.to_owned()))
            .bind(("limit", clamped.page_size as i64))
            .bind(("start", page.offset() as i64))
            .await
            .context("Listing artifact versions")?;

        let versions = response.take::<Vec<ArtifactVersion>>(0)?;
        let total = response.take::<Option<i64>>(1)?.unwrap_or_default();

        Ok((versions, usize::try_from(total).unwrap_or_default()))
    }

    /// Deletes a version; if it was latest, the most recently created
    /// remaining version of the project is promoted in the same transaction.
    pub(crate) async fn delete_and_promote(
        &self,
        record: &ArtifactVersion,
    ) -> Result<(), VersionsError> {
        let promote = if record.is_latest {
            "UPDATE artifact_version SET is_latest = true WHERE id IN (
                SELECT VALUE id FROM artifact_version WHERE project_id = $project_id
                ORDER BY created_at DESC LIMIT 1
            );"
        } else {
            ""
        };

        self.db
            .query(format!(
                "BEGIN TRANSACTION;
                DELETE type::thing('artifact_version', $id);
                {promote}
                COMMIT TRANSACTION;"
            ))
            .bind(("id", record.id.clone()))
            .bind(("project_id", record.project_id.clone()))
            .await
            .context("Deleting artifact version")?;

        Ok(())
    }

    /// Marks one version latest, clearing the flag on all of the project's
    /// other versions in the same transaction.
    pub(crate) async fn set_latest(
        &self,
        id: &str,
        project_id: &str,
    ) -> Result<(), VersionsError> {
        self.db
            .query(
                "BEGIN TRANSACTION;
                UPDATE artifact_version SET is_latest = false
                    WHERE project_id = $project_id AND is_latest = true;
                UPDATE type::thing('artifact_version', $id) SET is_latest = true;
                COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_owned()))
            .bind(("project_id", project_id.to_owned()))
            .await
            .context("Promoting artifact version")?;

        Ok(())
    }

    pub(crate) async fn delete_by_project(&self, project_id: &str) -> Result<(), VersionsError> {
        self.db
            .query("DELETE artifact_version WHERE project_id = $project_id")
            .bind(("project_id", project_id.to_owned()))
            .await
            .context("Purging artifact versions")?;

        Ok(())
    }
}
