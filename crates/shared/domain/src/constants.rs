//! Canonical entity and slice names.
//!
//! Table names double as `SurrealDB` table identifiers in migrations and
//! repositories; slice keys are what the feature registry and `FeatureSet`
//! parse.

// --- Table names ---

pub const PROJECT: &str = "project";
pub const CREDENTIAL: &str = "credential";
pub const ARTIFACT_VERSION: &str = "artifact_version";
pub const SIGNER_PROJECT: &str = "signer_project";
pub const SIGNER_TOKEN: &str = "signer_token";

// --- Slice keys ---

pub const ASSETS: &str = "assets";
pub const PROJECTS: &str = "projects";
pub const VERSIONS: &str = "versions";
pub const SIGNER: &str = "signer";
pub const SHARE: &str = "share";

// --- OpenAPI doc tags ---

pub const SYSTEM_TAG: &str = "System";
pub const AUTH_TAG: &str = "Auth";
pub const ASSETS_TAG: &str = "Assets";
pub const PROJECTS_TAG: &str = "Projects";
pub const VERSIONS_TAG: &str = "Versions";
pub const SIGNER_TAG: &str = "Signer";
pub const SHARE_TAG: &str = "Share";
