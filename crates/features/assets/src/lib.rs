//! # Stylesheet pipeline configuration
//!
//! This crate owns the declarative record consumed by the utility-class CSS build
//! tool that produces the admin frontend's stylesheet. The record tells the external
//! scanner where to look for class usage (`content` globs), which design tokens extend
//! the base theme (`theme.extend`), and which plugins the pipeline loads (`plugins`).
//!
//! The record is data, not behavior: it is loaded once at startup, validated
//! (glob syntax), exposed read-only over the admin API, and never mutated. The CSS
//! generation itself happens in the external tool; this crate only guarantees the
//! record's shape and its merge semantics.

mod error;
mod loader;

#[cfg(feature = "server")]
pub mod api;

pub use crate::error::{AssetsError, AssetsErrorExt};
pub use crate::loader::load_stylesheet_config;

use std::collections::BTreeMap;
use vhub_derive::api_model;
use vhub_kernel::domain::registry::InitializedSlice;

/// Design-token categories mapped to token/value pairs, e.g. `colors` → `primary`.
pub type ThemeTokens = BTreeMap<String, BTreeMap<String, String>>;

/// The declarative stylesheet pipeline record.
///
/// Matches the wire shape of the shipped `stylesheet.json` artifact. Unknown keys
/// are tolerated so the artifact can carry pipeline options this system does not
/// interpret.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StylesheetConfig {
    /// Glob patterns the class scanner walks, in scan order.
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Plugin references handed to the pipeline untouched; never defaulted.
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Theme section of the record; only additive extension is supported.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Token overrides merged onto the pipeline's base theme.
    #[serde(default)]
    pub extend: ThemeTokens,
}

impl StylesheetConfig {
    /// Serializes the record back into its declarative JSON form.
    ///
    /// # Errors
    /// Returns [`AssetsError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, AssetsError> {
        serde_json::to_string_pretty(self).map_err(AssetsError::from)
    }

    /// Deserializes a record from its declarative JSON form.
    ///
    /// # Errors
    /// Returns [`AssetsError::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, AssetsError> {
        serde_json::from_str(json).map_err(AssetsError::from)
    }

    /// Applies `theme.extend` onto a base token set.
    ///
    /// Extension keys augment the base; on a token collision the extension
    /// value wins. The base set itself lives in the external tool.
    #[must_use]
    pub fn merged_theme(&self, base: &ThemeTokens) -> ThemeTokens {
        let mut merged = base.clone();

        for (category, tokens) in &self.theme.extend {
            let slot = merged.entry(category.clone()).or_default();
            for (name, value) in tokens {
                slot.insert(name.clone(), value.clone());
            }
        }

        merged
    }
}

/// Assets feature state
#[vhub_derive::vhub_slice]
pub struct Assets {
    /// Stylesheet pipeline record, loaded once at startup.
    pub stylesheet: StylesheetConfig,
}

/// Initialize the assets feature from the configured record path.
///
/// # Errors
/// Returns an error if the record cannot be read, parsed, or carries an
/// invalid content glob.
pub fn init(path: impl AsRef<std::path::Path>) -> Result<InitializedSlice, AssetsError> {
    let stylesheet = load_stylesheet_config(path)?;

    tracing::info!("Assets server slice initialized");

    let inner = AssetsInner { stylesheet };

    let slice = Assets::new(inner);

    Ok(InitializedSlice::new(slice))
}
