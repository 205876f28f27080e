//! Rows and wire models for the artifact version registry.

use surrealdb::types::SurrealValue;
use vhub_derive::api_model;

/// One uploaded database artifact for a project.
///
/// `version` is the upload instant as a Unix timestamp string; `file_hash`
/// is the SHA-256 of the original bytes and doubles as the storage key
/// inside the project's namespace.
#[api_model]
#[derive(Clone, PartialEq, Eq, SurrealValue)]
pub struct ArtifactVersion {
    pub id: String,
    pub project_id: String,
    pub version: String,
    pub file_hash: String,
    pub file_name: String,
    pub file_size: u64,
    pub storage_key: String,
    #[serde(default)]
    pub description: String,
    pub is_latest: bool,
    pub created_at: String,
}

/// Outcome of an upload attempt.
///
/// A duplicate hash is not an error at the service level: the caller needs
/// the existing record to report the conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Created(ArtifactVersion),
    Duplicate(ArtifactVersion),
}

/// A downloaded artifact: original bytes plus the metadata needed for the
/// attachment headers.
#[derive(Debug, Clone)]
pub struct ArtifactDownload {
    pub version: ArtifactVersion,
    pub bytes: Vec<u8>,
}
