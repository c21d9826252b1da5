//! Cryptographic logics.

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use md5::{Digest, Md5};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
}

/// Cryptographic manager.
pub struct Crypto {
    pub pwd: PasswordManager,
}

impl Crypto {
    /// Create a new [`Crypto`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let pwd = PasswordManager::new(config)?;

        Ok(Self { pwd })
    }
}

/// PasswordManager hashes and verifies passwords with Argon2id.
///
/// Plaintext is never stored; only the PHC hash string reaches the
/// database.
#[derive(Clone)]
pub struct PasswordManager {
    argon2: Argon2<'static>,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();
        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(
                argon2::Algorithm::Argon2id,
                Version::V0x13,
                params,
            ),
        })
    }

    /// Hash a password into a PHC string with a random salt.
    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(password.as_ref(), &salt)
            .map_err(|err| CryptoError::Argon2(err.to_string()))?
            .to_string())
    }

    /// Check a candidate against a stored PHC string.
    ///
    /// An unparsable stored hash counts as a mismatch.
    pub fn verify_password(
        &self,
        candidate: impl AsRef<[u8]>,
        stored: &str,
    ) -> bool {
        PasswordHash::new(stored)
            .map(|hash| {
                self.argon2
                    .verify_password(candidate.as_ref(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Hex MD5 digest of the lowercased email, as gravatar expects.
pub fn avatar_hash(email: &str) -> String {
    hex::encode(Md5::digest(email.trim().to_lowercase()))
}

#[cfg(test)]
pub(crate) fn test_params() -> ArgonConfig {
    // Minimum parameters argon2 accepts.
    ArgonConfig {
        memory_cost: 8,
        iterations: 1,
        parallelism: 1,
        hash_length: 32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let pwd = PasswordManager::new(Some(test_params())).unwrap();
        let hash = pwd.hash_password("StRong_Pa$$W0rD").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(pwd.verify_password("StRong_Pa$$W0rD", &hash));
        assert!(!pwd.verify_password("wrong password", &hash));
        assert!(!pwd.verify_password("StRong_Pa$$W0rD", "not a phc string"));
    }

    #[test]
    fn test_avatar_hash_is_case_insensitive() {
        // Known MD5 digest of "test@example.com".
        assert_eq!(
            avatar_hash("Test@Example.COM"),
            "55502f40dc8b7c769880b10874abc9d0"
        );
        assert_eq!(avatar_hash("test@example.com"), avatar_hash(" TEST@EXAMPLE.COM "));
    }
}
