//! # One-time share codes
//!
//! Maps short numeric codes to tokens for out-of-band handover: an admin
//! creates a code, reads it to someone over a side channel, and the receiver
//! redeems it once. Codes live in a bounded in-memory TTL cache; nothing is
//! persisted, so a restart voids all outstanding codes.

mod error;

#[cfg(feature = "server")]
pub mod api;

pub use crate::error::{ShareError, ShareErrorExt};

use chrono::{Duration as ChronoDuration, Utc};
use moka::sync::Cache;
use std::time::Duration;
use tracing::{debug, info};
use vhub_derive::api_model;
use vhub_domain::config::AppConfig;
use vhub_kernel::domain::registry::InitializedSlice;
use vhub_kernel::security::ids::generate_share_code;
use vhub_kernel::time::format_utc;

/// How many collisions a code draw tolerates before giving up. With a
/// six-digit space this only trips when the cache is nearly saturated.
const MAX_CODE_ATTEMPTS: usize = 64;

/// A freshly created share code.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ShareCode {
    /// Six decimal digits
    pub code: String,
    pub expires_at: String,
}

/// A redeemed share: the carried token and the code's expiry.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct RedeemedShare {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Clone)]
struct ShareEntry {
    token: String,
    expires_at: String,
}

/// Share feature state
#[vhub_derive::vhub_slice]
pub struct Share {
    codes: Cache<String, ShareEntry>,
    ttl_seconds: u64,
}

/// Initialize the share feature.
///
/// # Errors
/// Returns [`ShareError::Validation`] on a zero TTL.
pub fn init(config: &AppConfig) -> Result<InitializedSlice, ShareError> {
    let share_cfg = &config.security.share;
    if share_cfg.ttl_seconds == 0 {
        return Err(ShareError::Validation {
            message: "Share TTL must be positive".into(),
            context: None,
        });
    }

    let codes = Cache::builder()
        .max_capacity(share_cfg.code_cache_capacity)
        .time_to_live(Duration::from_secs(share_cfg.ttl_seconds))
        .build();

    let slice = Share::new(ShareInner { codes, ttl_seconds: share_cfg.ttl_seconds });

    info!(ttl_seconds = share_cfg.ttl_seconds, "Share server slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Share {
    /// Creates a share code for `token`, unique among the codes still alive.
    ///
    /// # Errors
    /// Returns [`ShareError::Validation`] on an empty token and
    /// [`ShareError::Internal`] if no free code can be drawn.
    pub fn create(&self, token: String) -> Result<ShareCode, ShareError> {
        if token.trim().is_empty() {
            return Err(ShareError::Validation {
                message: "Token must not be empty".into(),
                context: None,
            });
        }

        let expires_at =
            format_utc(Utc::now() + ChronoDuration::seconds(self.ttl_seconds as i64));

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_share_code();
            if self.codes.contains_key(&code) {
                continue;
            }

            self.codes.insert(
                code.clone(),
                ShareEntry { token: token.clone(), expires_at: expires_at.clone() },
            );
            debug!(code = %code, "Share code created");

            return Ok(ShareCode { code, expires_at });
        }

        Err(ShareError::Internal {
            message: "Could not draw a free share code".into(),
            context: None,
        })
    }

    /// Redeems a code, consuming it: a second redeem is not-found.
    ///
    /// # Errors
    /// Returns [`ShareError::NotFound`] for unknown, expired or already
    /// redeemed codes.
    pub fn redeem(&self, code: &str) -> Result<RedeemedShare, ShareError> {
        let entry = self.codes.remove(code).ok_or_else(|| not_found(code))?;

        debug!(code = %code, "Share code redeemed");
        Ok(RedeemedShare { token: entry.token, expires_at: entry.expires_at })
    }

    /// Code metadata without consuming it.
    ///
    /// # Errors
    /// Returns [`ShareError::NotFound`] for unknown or expired codes.
    pub fn info(&self, code: &str) -> Result<ShareCode, ShareError> {
        let entry = self.codes.get(code).ok_or_else(|| not_found(code))?;
        Ok(ShareCode { code: code.to_owned(), expires_at: entry.expires_at })
    }
}

fn not_found(code: &str) -> ShareError {
    ShareError::NotFound { message: code.to_owned().into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> Share {
        let config = AppConfig::default();
        let initialized = init(&config).unwrap();
        initialized.state.as_any().downcast_ref::<Share>().unwrap().clone()
    }

    #[test]
    fn redeem_consumes_the_code() {
        let share = share();
        let created = share.create("signed-token".to_owned()).unwrap();
        assert_eq!(created.code.len(), 6);
        assert!(created.code.chars().all(|c| c.is_ascii_digit()));

        let redeemed = share.redeem(&created.code).unwrap();
        assert_eq!(redeemed.token, "signed-token");
        assert_eq!(redeemed.expires_at, created.expires_at);

        let err = share.redeem(&created.code).unwrap_err();
        assert!(matches!(err, ShareError::NotFound { .. }));
    }

    #[test]
    fn info_does_not_consume() {
        let share = share();
        let created = share.create("tok".to_owned()).unwrap();

        let first = share.info(&created.code).unwrap();
        let second = share.info(&created.code).unwrap();
        assert_eq!(first, second);

        share.redeem(&created.code).unwrap();
        assert!(share.info(&created.code).is_err());
    }

    #[test]
    fn empty_tokens_are_rejected() {
        let share = share();
        let err = share.create("   ".to_owned()).unwrap_err();
        assert!(matches!(err, ShareError::Validation { .. }));
    }

    #[test]
    fn codes_are_unique_while_alive() {
        let share = share();
        let a = share.create("one".to_owned()).unwrap();
        let b = share.create("two".to_owned()).unwrap();
        assert_ne!(a.code, b.code);

        assert_eq!(share.redeem(&a.code).unwrap().token, "one");
        assert_eq!(share.redeem(&b.code).unwrap().token, "two");
    }

    #[test]
    fn zero_ttl_fails_initialization() {
        let mut config = AppConfig::default();
        config.security.share.ttl_seconds = 0;
        assert!(matches!(init(&config), Err(ShareError::Validation { .. })));
    }
}
