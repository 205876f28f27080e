//! Convenience re-exports for application crates.

pub use crate::config::load_config;
pub use crate::safe_nanoid;
pub use vhub_domain::config::AppConfig;
pub use vhub_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::server::state::{ApiState, ApiStateBuilder};
