use vhub_kernel::security::ids::{
    CREDENTIAL_TOKEN_LENGTH, PROJECT_ID_LENGTH, SHARE_CODE_LENGTH, generate_credential_token,
    generate_project_id, generate_share_code, is_valid_credential_token, is_valid_project_id,
    is_valid_share_code,
};

#[test]
fn project_ids_are_uppercase_letters() {
    let id = generate_project_id();

    assert_eq!(id.len(), PROJECT_ID_LENGTH);
    assert!(id.bytes().all(|b| b.is_ascii_uppercase()), "unexpected character in {id}");
}

#[test]
fn credential_tokens_are_alphanumeric_uppercase() {
    let token = generate_credential_token();

    assert_eq!(token.len(), CREDENTIAL_TOKEN_LENGTH);
    assert!(token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
}

#[test]
fn share_codes_are_six_digits() {
    let code = generate_share_code();

    assert_eq!(code.len(), SHARE_CODE_LENGTH);
    assert!(code.bytes().all(|b| b.is_ascii_digit()));
}

#[test]
fn validation_rejects_malformed_values() {
    // Wrong length
    assert!(!is_valid_project_id("ABC"));
    // Lowercase
    assert!(!is_valid_project_id("abcdefgh"));
    // Digits in a project id
    assert!(!is_valid_project_id("ABCD1234"));

    assert!(!is_valid_credential_token("short"));
    assert!(!is_valid_credential_token(&"a".repeat(32)));

    assert!(!is_valid_share_code("12345"));
    assert!(!is_valid_share_code("12345a"));
}

#[test]
fn validation_accepts_wellformed_values() {
    assert!(is_valid_project_id("QWERTYUI"));
    assert!(is_valid_credential_token(&"A1".repeat(16)));
    assert!(is_valid_share_code("004217"));
}
