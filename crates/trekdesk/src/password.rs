//! Password hashing.

use crate::error::Result;

/// Prefix shared by every bcrypt hash variant (`$2a$`, `$2b$`, `$2y$`).
const BCRYPT_PREFIX: &str = "$2";

/// Hash `password` with the given bcrypt cost.
///
/// # Errors
///
/// Returns an error if the cost is out of range.
pub fn hash(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Whether a stored value is a bcrypt hash rather than legacy plaintext.
#[must_use]
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(BCRYPT_PREFIX)
}

/// Check `password` against a stored value.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify(password: &str, stored: &str) -> Result<bool> {
    if is_hashed(stored) {
        Ok(bcrypt::verify(password, stored)?)
    } else {
        Ok(password == stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash("Secret#123", TEST_COST).unwrap();
        assert!(is_hashed(&hashed));
        assert!(verify("Secret#123", &hashed).unwrap());
        assert!(!verify("secret#123", &hashed).unwrap());
    }

    #[test]
    fn test_legacy_plaintext() {
        assert!(!is_hashed("admin123"));
        assert!(verify("admin123", "admin123").unwrap());
        assert!(!verify("admin", "admin123").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify("x", "$2b$garbage").is_err());
    }

    #[test]
    fn test_bad_cost_is_error() {
        assert!(hash("x", 2).is_err());
    }
}
