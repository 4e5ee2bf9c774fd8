//! Infrastructure layer: account persistence and the account directory.

pub mod account_store;
pub mod directory;

pub use account_store::{
    AccountChanges, AccountRecord, AccountStore, InMemoryAccountStore, NewAccount,
    PostgresAccountStore, StoreError,
};
pub use directory::AccountDirectory;
