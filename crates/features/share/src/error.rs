use std::borrow::Cow;

/// Error types specific to the share feature.
#[vhub_derive::vhub_error]
pub enum ShareError {
    /// Caller-supplied data failed shape validation.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The code does not exist or has already expired or been redeemed.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal share error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
