//! `userhub-core`: account domain primitives.
//!
//! This crate contains **pure domain** types and input validation (no I/O,
//! no crypto, no HTTP).

pub mod account;
pub mod error;
pub mod id;
pub mod validate;

pub use account::{Account, AccountField, AccountPatch, Role};
pub use error::{AccountError, AccountResult, FieldError};
pub use id::AccountId;
