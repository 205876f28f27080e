//! Facade crate for `VersionHub` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `vhub` with the `server` feature flag.
//! - Call `vhub::init` to register feature slices; extend as new slices appear.

use vhub_database::Database;
pub use vhub_domain as domain;
use vhub_domain::config::AppConfig;
use vhub_event_bus::EventBus;
pub use vhub_kernel as kernel;
use vhub_storage::Storage;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use vhub_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use vhub_assets as assets;
    pub use vhub_projects as projects;
    pub use vhub_share as share;
    pub use vhub_signer as signer;
    pub use vhub_versions as versions;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "assets",
        "projects",
        "versions",
        "signer",
        "share",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// Order matters only in that versions subscribes to project deletions; the
/// bus buffers nothing across restarts, so both sides come up together here.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &AppConfig,
    database: &Database,
    storage: &Storage,
    events: &EventBus,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Assets
    slices.push(features::assets::init(&config.assets.stylesheet)?);

    // Projects & sync credentials
    slices.push(features::projects::init(config, database, events)?);

    // Artifact versions
    slices.push(features::versions::init(config, database, storage, events)?);

    // JWT signing
    slices.push(features::signer::init(database)?);

    // One-time share codes
    slices.push(features::share::init(config)?);

    Ok(slices)
}
