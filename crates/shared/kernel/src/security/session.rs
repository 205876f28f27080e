//! Admin session tokens: HS256-signed bearer tokens checked by the API middleware.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, get_current_timestamp};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[vhub_derive::vhub_error]
pub enum SessionError {
    #[error("Session token rejected{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
}

/// Role claim carried by every admin session token.
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Issues a signed session token for `username`, valid for `ttl_seconds`.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue_session_token(
    secret: &str,
    username: &str,
    ttl_seconds: u64,
) -> Result<String, SessionError> {
    let now = get_current_timestamp();
    let claims = SessionClaims {
        sub: username.to_owned(),
        role: ADMIN_ROLE.to_owned(),
        iat: now,
        exp: now + ttl_seconds,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

/// Verifies signature and expiry of a session token, returning its claims.
///
/// # Errors
/// Returns an error if the token is malformed, forged or expired.
pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, SessionError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}
