//! Persistent account collection boundary.
//!
//! Stores see full records, password hash included. Everything handed out of
//! [`crate::directory::AccountDirectory`] is redacted first.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use r#trait::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};
