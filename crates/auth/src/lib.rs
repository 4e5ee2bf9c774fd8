//! `userhub-auth`: credential, token and access-policy boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod attach;
pub mod claims;
pub mod identity;
pub mod password;
pub mod policy;
pub mod token;

pub use attach::{AttachDiagnostic, Attachment, TokenOrigin, TokenSource, resolve_identity};
pub use claims::{TokenClaims, TokenError, validate_claims};
pub use identity::Identity;
pub use password::{Argon2Hasher, CredentialHasher, HashingError, HashingParams};
pub use policy::{
    AccountOperation, AuthorizationDecision, DecisionReason, authorize, authorize_registration,
};
pub use token::{SigningSecret, TokenService, TokenVerifier};
pub use userhub_core::Role;
