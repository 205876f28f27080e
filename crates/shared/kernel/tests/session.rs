#![cfg(feature = "server")]

use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
use vhub_kernel::security::session::{
    ADMIN_ROLE, SessionClaims, issue_session_token, verify_session_token,
};

const TEST_SECRET: &str = "unit-test-secret";

#[test]
fn issue_and_verify_roundtrip() {
    let token = issue_session_token(TEST_SECRET, "admin", 3600).unwrap();
    let claims = verify_session_token(TEST_SECRET, &token).unwrap();

    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.role, ADMIN_ROLE);
    assert_eq!(claims.exp, claims.iat + 3600);
}

#[test]
fn wrong_secret_is_rejected() {
    let token = issue_session_token(TEST_SECRET, "admin", 3600).unwrap();

    assert!(verify_session_token("other-secret", &token).is_err());
}

#[test]
fn expired_token_is_rejected() {
    // Past the default sixty second validation leeway
    let now = get_current_timestamp();
    let claims = SessionClaims {
        sub: "admin".to_owned(),
        role: ADMIN_ROLE.to_owned(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let token =
        encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes()))
            .unwrap();

    assert!(verify_session_token(TEST_SECRET, &token).is_err());
}

#[test]
fn garbage_token_is_rejected() {
    assert!(verify_session_token(TEST_SECRET, "not-a-jwt").is_err());
}
