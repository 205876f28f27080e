use std::borrow::Cow;

/// Error types specific to the projects feature.
#[vhub_derive::vhub_error]
pub enum ProjectsError {
    /// Caller-supplied data failed shape validation.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The addressed project or credential does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The presented sync token is unknown, inactive, or bound to another project.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: vhub_database::DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal projects error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for ProjectsError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Database { source: source.into(), context: None }
    }
}
