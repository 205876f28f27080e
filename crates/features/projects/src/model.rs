//! Rows and wire models for the project catalog.

use surrealdb::types::SurrealValue;
use vhub_derive::api_model;

/// A registered client project.
#[api_model]
#[derive(Clone, PartialEq, Eq, SurrealValue)]
pub struct Project {
    /// Public project id: 8 uppercase ASCII letters
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A sync token bound to one project.
///
/// Only active credentials authorize the sync API. The raw token is shown to
/// the admin on creation and listing; clients present it as a bearer token.
#[api_model]
#[derive(Clone, PartialEq, Eq, SurrealValue)]
pub struct Credential {
    pub id: String,
    pub project_id: String,
    pub token: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a project.
#[api_model]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
}

/// Payload for updating a project; all fields replace the stored values.
#[api_model]
pub struct UpdateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
}
