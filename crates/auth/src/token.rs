//! Stateless identity tokens (HS256 JWT).
//!
//! Tokens carry the whole [`Identity`]; verifying one needs only the signing
//! secret, never a session table. There is no revocation: a token stays valid
//! until `exp`.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use crate::{Identity, TokenClaims, TokenError, validate_claims};

/// Minimum secret length accepted outside development mode.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signing secret must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
pub struct WeakSecretError(pub usize);

/// HMAC key material, loaded once at startup.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, WeakSecretError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(WeakSecretError(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// Skip the length check. Development and tests only.
    pub fn insecure(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Verification half of the token service, as seen by request middleware.
pub trait TokenVerifier: Send + Sync {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        // Time claims are checked by `validate_claims` against an explicit `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims::new(identity, now, self.ttl)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims.identity())
    }
}

impl TokenVerifier for TokenService {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        TokenService::verify_at(self, token, now)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
