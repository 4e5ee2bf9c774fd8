use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use userhub_core::{AccountError, AccountId, Role};

use crate::Identity;

/// Tolerated clock drift, in seconds, when checking `iat`.
pub const ISSUED_AT_LEEWAY_SECS: i64 = 5;

/// Claims carried inside an identity token.
///
/// Timestamps are whole epoch seconds on the wire (`iat` / `exp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id of the subject.
    pub sub: AccountId,

    pub email: String,

    pub role: Role,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl TokenClaims {
    /// Fails with [`TokenError::Signing`] when `issued_at + ttl` leaves the
    /// representable time range.
    pub fn new(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let exp = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry overflows with ttl {ttl}")))?;

        Ok(Self {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at,
            exp,
        })
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.email.clone(), self.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token signature does not match")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

impl From<TokenError> for AccountError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => AccountError::TokenExpired,
            _ => AccountError::TokenInvalid,
        }
    }
}

/// Deterministically validate the claims time window.
///
/// Signature verification happens before this, in [`crate::TokenService`].
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now + Duration::seconds(ISSUED_AT_LEEWAY_SECS) < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
