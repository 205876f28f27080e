use std::borrow::Cow;

/// Error types specific to the assets feature.
#[vhub_derive::vhub_error]
pub enum AssetsError {
    #[error("Stylesheet config file error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// JSON syntax or shape mismatch in the declarative record.
    #[error("Stylesheet config parse error{}: {source}", format_context(.context))]
    Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// A `content` entry that the scanner could never evaluate.
    #[error("Invalid content glob{}: {message}", format_context(.context))]
    InvalidGlob { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
