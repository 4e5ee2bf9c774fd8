use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use userhub_core::AccountId;

use super::r#trait::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};

/// In-memory account store for tests/dev.
///
/// Mirrors the Postgres schema's unique index on `lower(email)`.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    rows: BTreeMap<AccountId, AccountRecord>,
    last_id: i64,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<AccountId>) -> bool {
        let email = email.to_lowercase();
        self.rows
            .values()
            .any(|r| Some(r.id) != except && r.email.to_lowercase() == email)
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("account store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("account store lock poisoned".to_string()))
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .read()?
            .rows
            .values()
            .find(|r| r.email.to_lowercase() == email)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let mut inner = self.write()?;
        if inner.email_taken(&account.email, None) {
            return Err(StoreError::Conflict(format!(
                "email '{}' already exists",
                account.email
            )));
        }

        let id = AccountId::new(inner.last_id + 1)
            .map_err(|e| StoreError::Backend(format!("id sequence exhausted: {e}")))?;
        inner.last_id = id.get();

        let record = AccountRecord {
            id,
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.created_at,
        };
        inner.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let mut inner = self.write()?;
        if let Some(email) = &changes.email {
            if inner.rows.contains_key(&id) && inner.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(format!("email '{email}' already exists")));
            }
        }

        let Some(record) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(email) = changes.email {
            record.email = email;
        }
        if let Some(role) = changes.role {
            record.role = role;
        }
        if let Some(updated_at) = changes.updated_at {
            record.updated_at = updated_at;
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.write()?.rows.remove(&id))
    }
}
