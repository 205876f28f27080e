//! `SurrealDB` queries for signing projects and their tokens.

use crate::error::SignerError;
use crate::model::{SignerProject, SignerToken};
use vhub_database::{Database, DatabaseErrorExt};
use vhub_domain::pagination::PageRequest;

const PROJECT_FIELDS: &str = "id.id() AS id, name, description, public_key, private_key, \
                              created_at, updated_at";
const TOKEN_FIELDS: &str = "id.id() AS id, project_id, purpose, username, role, token, \
                            is_active, expires_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct SignerRepository {
    db: Database,
}

impl SignerRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn create_project(
        &self,
        project: &SignerProject,
    ) -> Result<(), SignerError> {
        self.db
            .query(
                "CREATE type::thing('signer_project', $id) CONTENT {
                    name: $name,
                    description: $description,
                    public_key: $public_key,
                    private_key: $private_key,
                    created_at: $created_at,
                    updated_at: $updated_at
                }",
            )
            .bind(("id", project.id.clone()))
            .bind(("name", project.name.clone()))
            .bind(("description", project.description.clone()))
            .bind(("public_key", project.public_key.clone()))
            .bind(("private_key", project.private_key.clone()))
            .bind(("created_at", project.created_at.clone()))
            .bind(("updated_at", project.updated_at.clone()))
            .await
            .context("Creating signer project")?;

        Ok(())
    }

    pub(crate) async fn get_project(
        &self,
        id: &str,
    ) -> Result<Option<SignerProject>, SignerError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM type::thing('signer_project', $id)"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading signer project")?;

        Ok(response.take::<Vec<SignerProject>>(0)?.into_iter().next())
    }

    pub(crate) async fn list_projects(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<SignerProject>, usize), SignerError> {
        let clamped = page.clamped();
        let mut response = self
            .db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM signer_project \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            ))
            .query("(SELECT VALUE count() FROM signer_project GROUP ALL)[0]")
            .bind(("limit", clamped.page_size as i64))
            .bind(("start", page.offset() as i64))
            .await
            .context("Listing signer projects")?;

        let projects = response.take::<Vec<SignerProject>>(0)?;
        let total = response.take::<Option<i64>>(1)?.unwrap_or_default();

        Ok((projects, usize::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn update_project(
        &self,
        id: &str,
        name: String,
        description: String,
        updated_at: String,
    ) -> Result<(), SignerError> {
        self.db
            .query(
                "UPDATE type::thing('signer_project', $id) SET
                    name = $name,
                    description = $description,
                    updated_at = $updated_at",
            )
            .bind(("id", id.to_owned()))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("updated_at", updated_at))
            .await
            .context("Updating signer project")?;

        Ok(())
    }

    /// Deletes a signing project together with every token issued under it.
    pub(crate) async fn delete_project(&self, id: &str) -> Result<(), SignerError> {
        self.db
            .query(
                "BEGIN TRANSACTION;
                DELETE signer_token WHERE project_id = $id;
                DELETE type::thing('signer_project', $id);
                COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting signer project")?;

        Ok(())
    }

    pub(crate) async fn create_token(&self, token: &SignerToken) -> Result<(), SignerError> {
        self.db
            .query(
                "CREATE type::thing('signer_token', $id) CONTENT {
                    project_id: $project_id,
                    purpose: $purpose,
                    username: $username,
                    role: $role,
                    token: $token,
                    is_active: $is_active,
                    expires_at: $expires_at,
                    created_at: $created_at,
                    updated_at: $updated_at
                }",
            )
            .bind(("id", token.id.clone()))
            .bind(("project_id", token.project_id.clone()))
            .bind(("purpose", token.purpose.clone()))
            .bind(("username", token.username.clone()))
            .bind(("role", token.role.clone()))
            .bind(("token", token.token.clone()))
            .bind(("is_active", token.is_active))
            .bind(("expires_at", token.expires_at.clone()))
            .bind(("created_at", token.created_at.clone()))
            .bind(("updated_at", token.updated_at.clone()))
            .await
            .context("Creating signer token")?;

        Ok(())
    }

    pub(crate) async fn get_token(&self, id: &str) -> Result<Option<SignerToken>, SignerError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {TOKEN_FIELDS} FROM type::thing('signer_token', $id)"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading signer token")?;

        Ok(response.take::<Vec<SignerToken>>(0)?.into_iter().next())
    }

    pub(crate) async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<SignerToken>, SignerError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {TOKEN_FIELDS} FROM signer_token WHERE token = $token LIMIT 1"
            ))
            .bind(("token", token.to_owned()))
            .await
            .context("Looking up signer token")?;

        Ok(response.take::<Vec<SignerToken>>(0)?.into_iter().next())
    }

    pub(crate) async fn list_tokens(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<SignerToken>, usize), SignerError> {
        let clamped = page.clamped();
        let mut response = self
            .db
            .query(format!(
                "SELECT {TOKEN_FIELDS} FROM signer_token WHERE project_id = $project_id \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            ))
            .query(
                "(SELECT VALUE count() FROM signer_token \
                 WHERE project_id = $project_id GROUP ALL)[0]",
            )
            .bind(("project_id", project_id.to_owned()))
            .bind(("limit", clamped.page_size as i64))
            .bind(("start", page.offset() as i64))
            .await
            .context("Listing signer tokens")?;

        let tokens = response.take::<Vec<SignerToken>>(0)?;
        let total = response.take::<Option<i64>>(1)?.unwrap_or_default();

        Ok((tokens, usize::try_from(total).unwrap_or_default()))
    }

    pub(crate) async fn set_token_active(
        &self,
        id: &str,
        is_active: bool,
        updated_at: String,
    ) -> Result<(), SignerError> {
        self.db
            .query(
                "UPDATE type::thing('signer_token', $id) SET
                    is_active = $is_active,
                    updated_at = $updated_at",
            )
            .bind(("id", id.to_owned()))
            .bind(("is_active", is_active))
            .bind(("updated_at", updated_at))
            .await
            .context("Toggling signer token")?;

        Ok(())
    }

    pub(crate) async fn delete_token(&self, id: &str) -> Result<(), SignerError> {
        self.db
            .query("DELETE type::thing('signer_token', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting signer token")?;

        Ok(())
    }

    /// Removes every token whose expiry lies before `now`, returning how many
    /// went away. Fixed-width timestamps make the comparison a string compare.
    pub(crate) async fn delete_expired(&self, now: &str) -> Result<usize, SignerError> {
        let mut response = self
            .db
            .query(
                "(SELECT VALUE count() FROM signer_token \
                 WHERE expires_at < $now GROUP ALL)[0]",
            )
            .query("DELETE signer_token WHERE expires_at < $now")
            .bind(("now", now.to_owned()))
            .await
            .context("Sweeping expired signer tokens")?;

        let removed = response.take::<Option<i64>>(0)?.unwrap_or_default();
        Ok(usize::try_from(removed).unwrap_or_default())
    }
}
