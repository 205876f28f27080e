//! Ed25519 keypair handling: generation, validation and JWT key material.
//!
//! Keys are carried as hex strings: the private key is the 32-byte seed, the
//! public key the 32-byte verifying key.

use crate::error::SignerError;
use ed25519_dalek::{SigningKey, VerifyingKey};
use getrandom::fill;
use jsonwebtoken::{DecodingKey, EncodingKey};

/// A hex-encoded Ed25519 keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypair {
    pub public_key: String,
    pub private_key: String,
}

/// Generates a fresh keypair from OS randomness.
///
/// # Errors
/// Returns [`SignerError::Internal`] if the OS RNG fails.
pub fn generate_keypair() -> Result<Keypair, SignerError> {
    let mut seed = [0u8; 32];
    fill(&mut seed).map_err(|e| SignerError::Internal {
        message: e.to_string().into(),
        context: Some("Failed to generate seed".into()),
    })?;

    let signing_key = SigningKey::from_bytes(&seed);
    Ok(Keypair {
        public_key: hex::encode(signing_key.verifying_key().to_bytes()),
        private_key: hex::encode(signing_key.to_bytes()),
    })
}

/// Checks that `private_key` is a well-formed seed deriving `public_key`.
///
/// # Errors
/// Returns [`SignerError::Validation`] on malformed hex, wrong lengths, or a
/// mismatched pair.
pub fn validate_keypair(keypair: &Keypair) -> Result<(), SignerError> {
    let signing_key = signing_key(&keypair.private_key)?;
    let derived = hex::encode(signing_key.verifying_key().to_bytes());

    if !derived.eq_ignore_ascii_case(&keypair.public_key) {
        return Err(SignerError::Validation {
            message: "Private key does not derive the given public key".into(),
            context: None,
        });
    }
    Ok(())
}

/// JWT signing key for a stored private key.
///
/// # Errors
/// Returns [`SignerError::Validation`] on malformed key material.
pub fn encoding_key(private_key_hex: &str) -> Result<EncodingKey, SignerError> {
    let signing_key = signing_key(private_key_hex)?;
    Ok(EncodingKey::from_ed_der(signing_key.to_bytes().as_ref()))
}

/// JWT verification key for a stored public key.
///
/// # Errors
/// Returns [`SignerError::Validation`] on malformed key material.
pub fn decoding_key(public_key_hex: &str) -> Result<DecodingKey, SignerError> {
    let bytes = decode_32(public_key_hex, "public key")?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| SignerError::Validation {
        message: format!("Invalid public key: {e}").into(),
        context: None,
    })?;

    Ok(DecodingKey::from_ed_der(&bytes))
}

fn signing_key(private_key_hex: &str) -> Result<SigningKey, SignerError> {
    let seed = decode_32(private_key_hex, "private key")?;
    Ok(SigningKey::from_bytes(&seed))
}

fn decode_32(hex_str: &str, label: &str) -> Result<[u8; 32], SignerError> {
    let bytes = hex::decode(hex_str).map_err(|e| SignerError::Validation {
        message: format!("Malformed {label} hex: {e}").into(),
        context: None,
    })?;

    bytes.try_into().map_err(|_| SignerError::Validation {
        message: format!("The {label} must be exactly 32 bytes").into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pairs_validate() {
        let pair = generate_keypair().unwrap();
        assert_eq!(pair.public_key.len(), 64);
        assert_eq!(pair.private_key.len(), 64);
        validate_keypair(&pair).unwrap();
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let a = generate_keypair().unwrap();
        let b = generate_keypair().unwrap();

        let mixed = Keypair { public_key: a.public_key, private_key: b.private_key };
        let err = validate_keypair(&mixed).unwrap_err();
        assert!(matches!(err, SignerError::Validation { .. }));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let err = decoding_key("zz").unwrap_err();
        assert!(matches!(err, SignerError::Validation { .. }));

        let err = encoding_key("abcd").unwrap_err();
        assert!(matches!(err, SignerError::Validation { .. }));
    }
}
