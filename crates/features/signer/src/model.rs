//! Rows and wire models for the signing service.

use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use vhub_derive::api_model;

/// A signing identity: one Ed25519 keypair plus the tokens issued under it.
///
/// Key material is hex-encoded; the private key only ever leaves through the
/// admin API.
#[api_model]
#[derive(Clone, PartialEq, Eq, SurrealValue)]
pub struct SignerProject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub public_key: String,
    pub private_key: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One issued JWT and its bookkeeping record.
///
/// `expires_at` uses the fixed-width UTC format so expiry sweeps compare
/// lexicographically.
#[api_model]
#[derive(Clone, PartialEq, Eq, SurrealValue)]
pub struct SignerToken {
    pub id: String,
    pub project_id: String,
    pub purpose: String,
    pub username: String,
    pub role: String,
    pub token: String,
    pub is_active: bool,
    pub expires_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Claims embedded in every signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub username: String,
    pub role: String,
    pub purpose: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

/// Payload for creating a signing project.
///
/// Leave both keys empty to have a keypair generated; supply both to import
/// an existing pair. Supplying only one is an error.
#[api_model]
pub struct CreateSignerProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
}

/// Payload for updating a signing project; keys are immutable.
#[api_model]
pub struct UpdateSignerProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Payload for signing a new token.
#[api_model]
pub struct CreateSignerToken {
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub purpose: String,
    /// Expiry as `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`, UTC, in the future
    pub expires_at: String,
}

/// Payload for verifying a previously issued token.
#[api_model]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Verification verdict with the claims on record.
#[api_model]
pub struct VerifyTokenResponse {
    pub valid: bool,
    /// Why verification failed, when it did
    pub reason: Option<String>,
    pub username: String,
    pub role: String,
    pub purpose: String,
    pub expires_at: String,
}
