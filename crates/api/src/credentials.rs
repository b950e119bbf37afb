//! Password hashing and verification.
//!
//! Hashing happens only through the explicit registration and
//! password-change paths; nothing in the codebase rehashes an already
//! stored value as a side effect of saving a record.

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(PasswordHashError),
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hash a plaintext password with Argon2id and a fresh random salt.
///
/// The work factor is the argon2 crate's fixed default (19 MiB memory,
/// 2 iterations, 1 lane) for the whole deployment.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(CredentialError::Hash)
}

/// Compare a candidate password against a stored hash.
///
/// A mismatch is a normal `Ok(false)` outcome; only a malformed stored
/// hash or a computation fault is an error. The stored hash is never
/// logged or returned.
pub fn verify_password(candidate: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| CredentialError::MalformedHash)?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(err) => Err(CredentialError::Hash(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_plaintext_verifies() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
    }

    #[test]
    fn any_other_string_fails_verification() {
        let hash = hash_password("secret123").unwrap();
        assert!(!verify_password("secret124", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
        // The hash itself must not verify against itself.
        assert!(!verify_password(&hash, &hash).unwrap());
    }

    #[test]
    fn hashing_is_salted() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret123", &first).unwrap());
        assert!(verify_password("secret123", &second).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_mismatch() {
        assert!(matches!(
            verify_password("secret123", "not-a-phc-string"),
            Err(CredentialError::MalformedHash)
        ));
    }

    #[test]
    fn hash_never_stores_plaintext() {
        let hash = hash_password("secret123").unwrap();
        assert!(!hash.contains("secret123"));
        assert!(hash.starts_with("$argon2"));
    }
}
