//! Salted password digests.
//!
//! Encoded as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with standard base64
//! for the binary parts, so the parameters travel with each stored hash.

use base64::{Engine as _, engine::general_purpose};
use ring::{
    digest, pbkdf2,
    rand::{SecureRandom, SystemRandom},
};
use std::num::NonZeroU32;
use thiserror::Error;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = digest::SHA256_OUTPUT_LEN;
const DEFAULT_ITERATIONS: u32 = 100_000;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("system random source unavailable")]
    Rng,
    #[error("stored password hash is malformed")]
    Malformed,
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_with_iterations(password, DEFAULT_ITERATIONS)
}

fn hash_with_iterations(password: &str, iterations: u32) -> Result<String, PasswordError> {
    let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::Malformed)?;
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| PasswordError::Rng)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        general_purpose::STANDARD.encode(salt),
        general_purpose::STANDARD.encode(hash)
    ))
}

/// Check `password` against an encoded digest. A wrong password is
/// `Ok(false)`; only an unreadable digest is an error.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::Malformed);
    };

    let iterations = iterations
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(PasswordError::Malformed)?;
    let salt = general_purpose::STANDARD
        .decode(salt)
        .map_err(|_| PasswordError::Malformed)?;
    let hash = general_purpose::STANDARD
        .decode(hash)
        .map_err(|_| PasswordError::Malformed)?;

    Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let encoded = hash_with_iterations("p1", 1_000).unwrap();
        assert!(encoded.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("p1", &encoded).unwrap());
        assert!(!verify_password("p2", &encoded).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_with_iterations("secret", 1_000).unwrap();
        let b = hash_with_iterations("secret", 1_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_is_not_stored() {
        let encoded = hash_password("hunter2").unwrap();
        assert!(!encoded.contains("hunter2"));
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert_eq!(
            verify_password("p1", "plain-text"),
            Err(PasswordError::Malformed)
        );
        assert_eq!(
            verify_password("p1", "pbkdf2-sha256$0$AAAA$AAAA"),
            Err(PasswordError::Malformed)
        );
    }
}
