use std::borrow::Cow;

/// Error types specific to the versions feature.
#[vhub_derive::vhub_error]
pub enum VersionsError {
    /// Caller-supplied data failed shape validation.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The addressed project or version does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The presented sync token does not authorize the addressed project.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The uploaded bytes exceed the configured artifact size cap.
    #[error("Artifact too large{}: {message}", format_context(.context))]
    TooLarge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: vhub_database::DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: vhub_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Internal versions error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for VersionsError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Database { source: source.into(), context: None }
    }
}

impl From<vhub_projects::ProjectsError> for VersionsError {
    fn from(source: vhub_projects::ProjectsError) -> Self {
        match source {
            vhub_projects::ProjectsError::Unauthorized { message, context } => {
                Self::Unauthorized { message, context }
            },
            other => Self::Internal { message: other.to_string().into(), context: None },
        }
    }
}
