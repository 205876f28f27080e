use std::borrow::Cow;

/// Error types specific to the signer feature.
#[vhub_derive::vhub_error]
pub enum SignerError {
    /// Caller-supplied data failed shape validation.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The addressed signing project or token does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token error{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: vhub_database::DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal signer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for SignerError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Database { source: source.into(), context: None }
    }
}
