//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored as PHC strings, so parameters and salt travel with the
//! hash and older hashes keep verifying after parameters change.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher using the crate's recommended default parameters.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(encoded)
            .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    fn hash_verifies_the_original_password(hasher: Argon2PasswordHasher) {
        let encoded = hasher.hash("gudang-123").expect("hash");

        assert!(encoded.starts_with("$argon2id$"));
        assert!(hasher.verify("gudang-123", &encoded).expect("verify"));
    }

    #[rstest]
    fn wrong_password_is_rejected(hasher: Argon2PasswordHasher) {
        let encoded = hasher.hash("gudang-123").expect("hash");
        assert!(!hasher.verify("gudang-124", &encoded).expect("verify"));
    }

    #[rstest]
    fn same_password_gets_distinct_salts(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("gudang-123").expect("hash");
        let second = hasher.hash("gudang-123").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    #[case("$2b$10$legacybcrypthashvalue")]
    fn malformed_hash_is_an_error(hasher: Argon2PasswordHasher, #[case] encoded: &str) {
        assert!(matches!(
            hasher.verify("gudang-123", encoded),
            Err(PasswordHashError::MalformedHash { .. })
        ));
    }
}
