use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use userhub_core::{Account, AccountError, AccountId, Role};

/// A stored account, credential material included.
///
/// Never leaves the infrastructure layer; call [`AccountRecord::redact`] first.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn redact(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl core::fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Column-level changes for an update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint (email) rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(_) => AccountError::AlreadyExists,
            StoreError::Backend(msg) => AccountError::Storage(msg),
        }
    }
}

/// CRUD collaborator over the account collection.
///
/// Every write is a single statement; there are no multi-step transactions.
/// Email lookups are case-insensitive.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    async fn insert(&self, account: NewAccount) -> Result<AccountRecord, StoreError>;

    /// Returns `None` when `id` does not exist.
    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError>;

    /// Returns the removed record, or `None` when `id` does not exist.
    async fn delete(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError>;
}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        (**self).list().await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        (**self).insert(account).await
    }

    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        (**self).delete(id).await
    }
}
