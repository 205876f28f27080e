//! Generators and validators for the public id formats used across slices.
//!
//! Three formats exist, each tuned to how the value travels:
//! * project ids are read aloud and typed, so uppercase letters only
//! * credential tokens go into headers, so a wider alphanumeric alphabet
//! * share codes are punched into an install prompt, so digits only

use nanoid::nanoid;

/// Uppercase letters for public project ids.
pub const PROJECT_ID_ALPHABET: &[char; 26] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
pub const PROJECT_ID_LENGTH: usize = 8;

/// Uppercase letters and digits for credential tokens.
pub const CREDENTIAL_ALPHABET: &[char; 36] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
pub const CREDENTIAL_TOKEN_LENGTH: usize = 32;

/// Digits for share codes.
pub const SHARE_CODE_ALPHABET: &[char; 10] =
    &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];
pub const SHARE_CODE_LENGTH: usize = 6;

#[must_use]
pub fn generate_project_id() -> String {
    nanoid!(PROJECT_ID_LENGTH, PROJECT_ID_ALPHABET)
}

#[must_use]
pub fn generate_credential_token() -> String {
    nanoid!(CREDENTIAL_TOKEN_LENGTH, CREDENTIAL_ALPHABET)
}

#[must_use]
pub fn generate_share_code() -> String {
    nanoid!(SHARE_CODE_LENGTH, SHARE_CODE_ALPHABET)
}

/// Checks the shape of a caller-supplied project id before it reaches the database.
#[must_use]
pub fn is_valid_project_id(id: &str) -> bool {
    id.len() == PROJECT_ID_LENGTH && id.bytes().all(|b| b.is_ascii_uppercase())
}

#[must_use]
pub fn is_valid_credential_token(token: &str) -> bool {
    token.len() == CREDENTIAL_TOKEN_LENGTH
        && token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[must_use]
pub fn is_valid_share_code(code: &str) -> bool {
    code.len() == SHARE_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_pass_validation() {
        assert!(is_valid_project_id(&generate_project_id()));
        assert!(is_valid_credential_token(&generate_credential_token()));
        assert!(is_valid_share_code(&generate_share_code()));
    }
}
