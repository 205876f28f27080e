//! # JWT signing service
//!
//! Each signing project owns an Ed25519 keypair. Tokens are EdDSA-signed JWTs
//! carrying `username`/`role`/`purpose` plus the standard time claims; every
//! issued token is kept on record so it can be revoked or verified later.

mod error;
mod keys;
mod model;
mod repository;

#[cfg(feature = "server")]
pub mod api;

pub use crate::error::{SignerError, SignerErrorExt};
pub use crate::keys::{Keypair, generate_keypair, validate_keypair};
pub use crate::model::{
    CreateSignerProject, CreateSignerToken, SignerProject, SignerToken, TokenClaims,
    UpdateSignerProject, VerifyTokenRequest, VerifyTokenResponse,
};

use crate::repository::SignerRepository;
use chrono::{DateTime, NaiveDateTime, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use tracing::info;
use vhub_database::Database;
use vhub_domain::pagination::PageRequest;
use vhub_kernel::domain::registry::InitializedSlice;
use vhub_kernel::safe_nanoid;
use vhub_kernel::time::{format_utc, utc_now};

/// Signer feature state
#[vhub_derive::vhub_slice]
pub struct Signer {
    repository: SignerRepository,
}

/// Initialize the signer feature.
///
/// # Errors
/// Never fails today; the signature leaves room for config validation.
pub fn init(database: &Database) -> Result<InitializedSlice, SignerError> {
    let slice = Signer::new(SignerInner { repository: SignerRepository::new(database.clone()) });

    info!("Signer server slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Signer {
    /// Creates a signing project.
    ///
    /// With both key fields empty a fresh keypair is generated; with both
    /// supplied the pair is validated. Supplying only one is an error.
    ///
    /// # Errors
    /// Returns [`SignerError::Validation`] on an empty name, a half-supplied
    /// pair, or key material that does not validate.
    pub async fn create_project(
        &self,
        request: CreateSignerProject,
    ) -> Result<SignerProject, SignerError> {
        validate_name(&request.name)?;

        let keypair = match (request.public_key.is_empty(), request.private_key.is_empty()) {
            (true, true) => generate_keypair()?,
            (false, false) => {
                let pair = Keypair {
                    public_key: request.public_key,
                    private_key: request.private_key,
                };
                validate_keypair(&pair)?;
                pair
            },
            _ => {
                return Err(SignerError::Validation {
                    message: "Supply both keys or neither".into(),
                    context: None,
                });
            },
        };

        let now = utc_now();
        let project = SignerProject {
            id: safe_nanoid!(),
            name: request.name,
            description: request.description,
            public_key: keypair.public_key,
            private_key: keypair.private_key,
            created_at: now.clone(),
            updated_at: now,
        };

        self.repository.create_project(&project).await?;
        info!(project_id = %project.id, "Signer project created");

        Ok(project)
    }

    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn get_project(&self, id: &str) -> Result<SignerProject, SignerError> {
        self.repository.get_project(id).await?.ok_or_else(|| not_found(id))
    }

    /// Newest-first page of signing projects.
    ///
    /// # Errors
    /// Returns [`SignerError::Database`] if the query fails.
    pub async fn list_projects(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<SignerProject>, usize), SignerError> {
        self.repository.list_projects(page).await
    }

    /// Updates name and description; key material is immutable.
    ///
    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn update_project(
        &self,
        id: &str,
        request: UpdateSignerProject,
    ) -> Result<SignerProject, SignerError> {
        validate_name(&request.name)?;
        self.get_project(id).await?;

        self.repository
            .update_project(id, request.name, request.description, utc_now())
            .await?;

        self.get_project(id).await
    }

    /// Deletes a signing project and every token issued under it.
    ///
    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn delete_project(&self, id: &str) -> Result<(), SignerError> {
        self.get_project(id).await?;
        self.repository.delete_project(id).await?;

        info!(project_id = %id, "Signer project deleted");
        Ok(())
    }

    /// Signs a new token under `project_id` and records it.
    ///
    /// # Errors
    /// Returns [`SignerError::Validation`] on an unparsable or non-future
    /// expiry and [`SignerError::NotFound`] for an unknown project.
    pub async fn create_token(
        &self,
        project_id: &str,
        request: CreateSignerToken,
    ) -> Result<SignerToken, SignerError> {
        if request.username.trim().is_empty() || request.role.trim().is_empty() {
            return Err(SignerError::Validation {
                message: "Username and role must not be empty".into(),
                context: None,
            });
        }

        let expiry = parse_expiry(&request.expires_at)?;
        let now = Utc::now();
        if expiry <= now {
            return Err(SignerError::Validation {
                message: "Expiry must lie in the future".into(),
                context: None,
            });
        }

        let project = self.get_project(project_id).await?;

        let claims = TokenClaims {
            username: request.username.clone(),
            role: request.role.clone(),
            purpose: request.purpose.clone(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };
        let encoding_key = keys::encoding_key(&project.private_key)?;
        let jwt = encode(&Header::new(Algorithm::EdDSA), &claims, &encoding_key)
            .map_err(|source| SignerError::Token { source, context: None })?;

        let stamp = utc_now();
        let token = SignerToken {
            id: safe_nanoid!(),
            project_id: project_id.to_owned(),
            purpose: request.purpose,
            username: request.username,
            role: request.role,
            token: jwt,
            is_active: true,
            expires_at: format_utc(expiry),
            created_at: stamp.clone(),
            updated_at: stamp,
        };

        self.repository.create_token(&token).await?;
        info!(project_id = %project_id, token_id = %token.id, "Token signed");

        Ok(token)
    }

    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn get_token(&self, id: &str) -> Result<SignerToken, SignerError> {
        self.repository.get_token(id).await?.ok_or_else(|| not_found(id))
    }

    /// Newest-first page of a project's tokens.
    ///
    /// # Errors
    /// Returns [`SignerError::Database`] if the query fails.
    pub async fn list_tokens(
        &self,
        project_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<SignerToken>, usize), SignerError> {
        self.repository.list_tokens(project_id, page).await
    }

    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn set_token_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<SignerToken, SignerError> {
        self.get_token(id).await?;
        self.repository.set_token_active(id, is_active, utc_now()).await?;
        self.get_token(id).await
    }

    /// # Errors
    /// Returns [`SignerError::NotFound`] for an unknown id.
    pub async fn delete_token(&self, id: &str) -> Result<(), SignerError> {
        self.get_token(id).await?;
        self.repository.delete_token(id).await
    }

    /// Removes every token past its expiry, returning how many went away.
    ///
    /// # Errors
    /// Returns [`SignerError::Database`] if the sweep fails.
    pub async fn delete_expired(&self) -> Result<usize, SignerError> {
        let removed = self.repository.delete_expired(&utc_now()).await?;
        if removed > 0 {
            info!(removed, "Expired tokens swept");
        }
        Ok(removed)
    }

    /// Verifies a previously issued token against its project's public key.
    ///
    /// The verdict reports the claims on record even when verification fails,
    /// so an admin can see what an expired or revoked token carried.
    ///
    /// # Errors
    /// Returns [`SignerError::NotFound`] for a token that was never issued
    /// here.
    pub async fn verify(&self, token: &str) -> Result<VerifyTokenResponse, SignerError> {
        let record = self.repository.find_by_token(token).await?.ok_or_else(|| {
            SignerError::NotFound { message: "Unknown token".into(), context: None }
        })?;

        let project = self.get_project(&record.project_id).await?;
        let decoding_key = keys::decoding_key(&project.public_key)?;

        let reason = if record.is_active {
            match decode::<TokenClaims>(token, &decoding_key, &Validation::new(Algorithm::EdDSA))
            {
                Ok(_) => None,
                Err(err) if is_expired(&err) => Some("expired".to_owned()),
                Err(_) => Some("invalid signature".to_owned()),
            }
        } else {
            Some("revoked".to_owned())
        };

        Ok(VerifyTokenResponse {
            valid: reason.is_none(),
            reason,
            username: record.username,
            role: record.role,
            purpose: record.purpose,
            expires_at: record.expires_at,
        })
    }
}

fn is_expired(err: &jsonwebtoken::errors::Error) -> bool {
    matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature)
}

/// Parses `YYYY-MM-DDTHH:MM[:SS]` as a UTC instant.
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, SignerError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|naive| naive.and_utc())
        .map_err(|_| SignerError::Validation {
            message: format!("Unparsable expiry: {raw}").into(),
            context: None,
        })
}

fn validate_name(name: &str) -> Result<(), SignerError> {
    if name.trim().is_empty() {
        return Err(SignerError::Validation {
            message: "Project name must not be empty".into(),
            context: None,
        });
    }
    Ok(())
}

fn not_found(id: &str) -> SignerError {
    SignerError::NotFound { message: id.to_owned().into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::parse_expiry;

    #[test]
    fn expiry_accepts_both_precisions() {
        let minute = parse_expiry("2030-06-15T12:30").unwrap();
        let second = parse_expiry("2030-06-15T12:30:45").unwrap();

        assert_eq!(minute.timestamp() + 45, second.timestamp());
        assert!(parse_expiry("2030-06-15 12:30").is_err());
        assert!(parse_expiry("tomorrow").is_err());
    }
}
