pub mod password_policy;

use crate::errors::ServiceError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub use password_policy::{PasswordPolicy, PasswordPolicyError};

/// Hashes a password into an Argon2id PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

/// Checks a password against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, ServiceError> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ServiceError::HashError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let first = hash_password("dispatch-2025").unwrap();
        let second = hash_password("dispatch-2025").unwrap();

        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
        assert!(verify_password("dispatch-2025", &first).unwrap());
        assert!(!verify_password("dispatch-2026", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("whatever", "plain-text"),
            Err(ServiceError::HashError(_))
        ));
    }
}
