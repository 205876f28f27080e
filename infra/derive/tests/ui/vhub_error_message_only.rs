use std::borrow::Cow;
use vhub_derive::vhub_error;

#[vhub_error]
pub enum QuotaError {
    #[error("Upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Version already stored{}: {hash}", format_context(.context))]
    Duplicate { hash: String, context: Option<Cow<'static, str>> },
}

fn main() {}
