//! Password hashing and verification using Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`) that embed the salt and
//! the work factor, so a hash stays verifiable after the configured work
//! factor changes.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

use userhub_core::AccountError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashingError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("invalid password hash format: {0}")]
    MalformedHash(String),

    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),
}

impl From<HashingError> for AccountError {
    fn from(value: HashingError) -> Self {
        AccountError::HashingError(value.to_string())
    }
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way password hashing.
///
/// Both operations are CPU-bound; async callers should run them on a
/// blocking thread.
pub trait CredentialHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt.
    fn hash(&self, plaintext: &str) -> Result<String, HashingError>;

    /// Returns `Ok(false)` on mismatch; errors only when `hash` is not a
    /// parseable PHC string.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError>;
}

#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl core::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    pub fn new(params: HashingParams) -> Result<Self, HashingError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| HashingError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError::Hash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| HashingError::MalformedHash(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::MalformedHash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::new(HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("password123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("password123"));
        assert!(hasher.verify("password123", &hash).unwrap());
        assert!(!hasher.verify("password124", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let hasher = fast_hasher();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("same-password", &a).unwrap());
        assert!(hasher.verify("same-password", &b).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let err = fast_hasher().verify("password", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, HashingError::MalformedHash(_)));
    }

    #[test]
    fn hash_from_other_work_factor_still_verifies() {
        let hash = fast_hasher().hash("password123").unwrap();
        let stronger = Argon2Hasher::new(HashingParams {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify("password123", &hash).unwrap());
    }

    #[test]
    fn rejects_impossible_params() {
        let err = Argon2Hasher::new(HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, HashingError::InvalidParams(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        /// Property: a hash verifies its own plaintext and no other.
        #[test]
        fn verify_accepts_only_the_hashed_password(
            password in "[ -~]{6,32}",
            other in "[ -~]{6,32}",
        ) {
            let hasher = fast_hasher();
            let hash = hasher.hash(&password).unwrap();

            prop_assert!(hasher.verify(&password, &hash).unwrap());
            if other != password {
                prop_assert!(!hasher.verify(&other, &hash).unwrap());
            }
        }
    }
}
