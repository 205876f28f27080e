//! `SurrealDB` queries for projects and credentials.
//!
//! All timestamps are fixed-width RFC 3339 strings (see `vhub_kernel::time`),
//! so `ORDER BY created_at DESC` yields newest-first without parsing.

use crate::error::ProjectsError;
use crate::model::{Credential, Project};
use vhub_database::{Database, DatabaseErrorExt};
use vhub_domain::pagination::PageRequest;
use vhub_kernel::safe_nanoid;
use vhub_kernel::security::ids::generate_credential_token;
use vhub_kernel::time::utc_now;

const PROJECT_FIELDS: &str = "id.id() AS id, name, description, website, created_at, updated_at";
const CREDENTIAL_FIELDS: &str =
    "id.id() AS id, project_id, token, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct ProjectRepository {
    db: Database,
}

impl ProjectRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn create_project(
        &self,
        id: String,
        name: String,
        description: String,
        website: String,
    ) -> Result<Project, ProjectsError> {
        let now = utc_now();
        let project = Project {
            id,
            name,
            description,
            website,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db
            .query(
                "CREATE type::thing('project', $id) CONTENT {
                    name: $name,
                    description: $description,
                    website: $website,
                    created_at: $created_at,
                    updated_at: $updated_at
                }",
            )
            .bind(("id", project.id.clone()))
            .bind(("name", project.name.clone()))
            .bind(("description", project.description.clone()))
            .bind(("website", project.website.clone()))
            .bind(("created_at", project.created_at.clone()))
            .bind(("updated_at", project.updated_at.clone()))
            .await
            .context("Creating project")?;

        Ok(project)
    }

    pub(crate) async fn get_project(&self, id: &str) -> Result<Option<Project>, ProjectsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM type::thing('project', $id)"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading project")?;

        Ok(response.take::<Vec<Project>>(0)?.into_iter().next())
    }

    pub(crate) async fn list_projects(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<Project>, usize), ProjectsError> {
        let clamped = page.clamped();
        let mut response = self
            .db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM project \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            ))
            .query("(SELECT VALUE count() FROM project GROUP ALL)[0]")
            .bind(("limit", clamped.page_size as i64))
            .bind(("start", page.offset() as i64))
            .await
            .context("Listing projects")?;

        let projects = response.take::<Vec<Project>>(0)?;
        let total = response.take::<Option<i64>>(1)?.unwrap_or_default();

        Ok((projects, usize::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn update_project(
        &self,
        id: &str,
        name: String,
        description: String,
        website: String,
    ) -> Result<Option<Project>, ProjectsError> {
        self.db
            .query(
                "UPDATE type::thing('project', $id) SET
                    name = $name,
                    description = $description,
                    website = $website,
                    updated_at = $updated_at",
            )
            .bind(("id", id.to_owned()))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("website", website))
            .bind(("updated_at", utc_now()))
            .await
            .context("Updating project")?;

        self.get_project(id).await
    }

    /// Deletes a project together with its credentials.
    pub(crate) async fn delete_project(&self, id: &str) -> Result<(), ProjectsError> {
        self.db
            .query(
                "BEGIN TRANSACTION;
                DELETE credential WHERE project_id = $id;
                DELETE type::thing('project', $id);
                COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting project")?;

        Ok(())
    }

    pub(crate) async fn create_credential(
        &self,
        project_id: String,
    ) -> Result<Credential, ProjectsError> {
        let now = utc_now();
        let credential = Credential {
            id: safe_nanoid!(),
            project_id,
            token: generate_credential_token(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db
            .query(
                "CREATE type::thing('credential', $id) CONTENT {
                    project_id: $project_id,
                    token: $token,
                    is_active: $is_active,
                    created_at: $created_at,
                    updated_at: $updated_at
                }",
            )
            .bind(("id", credential.id.clone()))
            .bind(("project_id", credential.project_id.clone()))
            .bind(("token", credential.token.clone()))
            .bind(("is_active", credential.is_active))
            .bind(("created_at", credential.created_at.clone()))
            .bind(("updated_at", credential.updated_at.clone()))
            .await
            .context("Creating credential")?;

        Ok(credential)
    }

    pub(crate) async fn get_credential(
        &self,
        id: &str,
    ) -> Result<Option<Credential>, ProjectsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {CREDENTIAL_FIELDS} FROM type::thing('credential', $id)"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading credential")?;

        Ok(response.take::<Vec<Credential>>(0)?.into_iter().next())
    }

    /// Looks up an **active** credential by its raw token.
    pub(crate) async fn find_active_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Credential>, ProjectsError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {CREDENTIAL_FIELDS} FROM credential \
                 WHERE token = $token AND is_active = true LIMIT 1"
            ))
            .bind(("token", token.to_owned()))
            .await
            .context("Looking up credential by token")?;

        Ok(response.take::<Vec<Credential>>(0)?.into_iter().next())
    }

    pub(crate) async fn list_credentials(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Credential>, usize), ProjectsError> {
        let clamped = page.clamped();
        let mut response = self
            .db
            .query(format!(
                "SELECT {CREDENTIAL_FIELDS} FROM credential WHERE project_id = $project_id \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            ))
            .query(
                "(SELECT VALUE count() FROM credential WHERE project_id = $project_id GROUP ALL)[0]",
            )
            .bind(("project_id", project_id.to_owned()))
            .bind(("limit", clamped.page_size as i64))
            .bind(("start", page.offset() as i64))
            .await
            .context("Listing credentials")?;

        let credentials = response.take::<Vec<Credential>>(0)?;
        let total = response.take::<Option<i64>>(1)?.unwrap_or_default();

        Ok((credentials, usize::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn set_credential_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<(), ProjectsError> {
        self.db
            .query(
                "UPDATE type::thing('credential', $id) SET
                    is_active = $is_active,
                    updated_at = $updated_at",
            )
            .bind(("id", id.to_owned()))
            .bind(("is_active", is_active))
            .bind(("updated_at", utc_now()))
            .await
            .context("Toggling credential")?;

        Ok(())
    }

    pub(crate) async fn delete_credential(&self, id: &str) -> Result<(), ProjectsError> {
        self.db
            .query("DELETE type::thing('credential', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting credential")?;

        Ok(())
    }
}
