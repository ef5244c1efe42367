//! One-way password hashing. bcrypt with the same cost factor the stored
//! hashes were created with, so existing credentials keep verifying.

use crate::app_error::{AppError, AppResult};

const BCRYPT_COST: u32 = 10;

pub fn hash(plaintext: &str) -> AppResult<String> {
    bcrypt::hash(plaintext, BCRYPT_COST).map_err(|e| AppError::Internal(e.to_string()))
}

/// Verify a plaintext password against a stored hash.
///
/// Fails closed: a malformed or empty stored hash verifies as `false`, it
/// never surfaces as an error to the caller.
pub fn verify(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed));
        assert!(!verify("wrong password", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("secret").unwrap();
        let b = hash("secret").unwrap();
        assert_ne!(a, b);
        assert!(verify("secret", &a));
        assert!(verify("secret", &b));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-bcrypt-hash"));
        assert!(!verify("anything", "$2b$10$truncated"));
    }
}
