//! Loads and validates the declarative stylesheet pipeline record.

use crate::error::{AssetsError, AssetsErrorExt};
use crate::StylesheetConfig;
use glob::Pattern;
use std::path::Path;
use tracing::{info, warn};

/// Reads the stylesheet pipeline record from `path`.
///
/// Loading is idempotent: repeated loads of the same file yield structurally
/// identical records. Glob syntax in `content` is checked here; a pattern the
/// scanner could never evaluate fails the load.
///
/// An empty `content` sequence is accepted with a warning: the pipeline would
/// then emit base-theme utilities only.
///
/// # Errors
/// Returns an error if the file cannot be read, the JSON is malformed, or a
/// `content` pattern is not a valid glob.
pub fn load_stylesheet_config(path: impl AsRef<Path>) -> Result<StylesheetConfig, AssetsError> {
    let path = path.as_ref();

    let raw = std::fs::read_to_string(path).context("Reading stylesheet config")?;
    let config: StylesheetConfig =
        serde_json::from_str(&raw).context("Parsing stylesheet config")?;

    validate_content_globs(&config.content)?;

    if config.content.is_empty() {
        warn!("Stylesheet config lists no content globs; only base-theme utilities will be generated");
    }

    info!(
        path = %path.display(),
        globs = config.content.len(),
        plugins = config.plugins.len(),
        "Stylesheet config loaded"
    );

    Ok(config)
}

/// Every pattern must parse; scan order is preserved but carries no precedence.
fn validate_content_globs(patterns: &[String]) -> Result<(), AssetsError> {
    for pattern in patterns {
        Pattern::new(pattern).map_err(|e| AssetsError::InvalidGlob {
            message: format!("{pattern}: {e}").into(),
            context: None,
        })?;
    }

    Ok(())
}
