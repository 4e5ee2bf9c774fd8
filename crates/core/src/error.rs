//! Account error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the account layers.
pub type AccountResult<T> = Result<T, AccountError>;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failure an account operation can surface.
///
/// The transport layer selects a status code per variant; variants are
/// matched exhaustively, never compared by message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// No account with the requested id or email.
    #[error("account not found")]
    NotFound,

    /// An account with this email is already registered.
    #[error("account already exists")]
    AlreadyExists,

    /// The email exists but the password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The operation requires an identity and none was attached.
    #[error("authentication required")]
    Unauthenticated,

    /// The actor is neither the account owner nor an admin.
    #[error("only the account owner or an admin may do this")]
    NotOwner,

    /// A non-admin tried to set a role.
    #[error("only admins may change roles")]
    PrivilegeEscalation,

    /// Input was malformed; one entry per rejected field.
    #[error("validation failed: {}", join_fields(.0))]
    ValidationFailed(Vec<FieldError>),

    /// Password hashing or hash parsing failed.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The token is malformed, unsigned or tampered with.
    #[error("token invalid")]
    TokenInvalid,

    /// The token's expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// The backing store failed for a reason other than a uniqueness conflict.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl AccountError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![FieldError::new(field, message)])
    }

    pub fn hashing(msg: impl Into<String>) -> Self {
        Self::HashingError(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Hashing or storage failures, as opposed to rejected input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AccountError::HashingError(_) | AccountError::Storage(_))
    }

    /// Stable machine-readable code for responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::NotFound => "not_found",
            AccountError::AlreadyExists => "already_exists",
            AccountError::InvalidCredentials => "invalid_credentials",
            AccountError::Unauthenticated => "unauthenticated",
            AccountError::NotOwner => "not_owner",
            AccountError::PrivilegeEscalation => "privilege_escalation",
            AccountError::ValidationFailed(_) => "validation_failed",
            AccountError::HashingError(_) => "hashing_error",
            AccountError::TokenInvalid => "token_invalid",
            AccountError::TokenExpired => "token_expired",
            AccountError::Storage(_) => "storage_error",
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
