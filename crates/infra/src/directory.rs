//! Account directory: CRUD over the account store with password redaction.
//!
//! Every value returned from here is an [`Account`]; password hashes never
//! leave this module.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use userhub_auth::CredentialHasher;
use userhub_core::validate::{Credentials, Registration};
use userhub_core::{Account, AccountError, AccountId, AccountPatch};

use crate::account_store::{AccountChanges, AccountStore, NewAccount};

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn AccountStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// All accounts. Order is whatever the store yields.
    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        let records = self.store.list().await?;
        Ok(records.into_iter().map(|r| r.redact()).collect())
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, AccountError> {
        self.store
            .find_by_id(id)
            .await?
            .map(|r| r.redact())
            .ok_or(AccountError::NotFound)
    }

    /// Register a new account.
    ///
    /// The email pre-check is not atomic with the insert; a concurrent
    /// duplicate is caught by the store's uniqueness constraint and surfaces
    /// as the same `AlreadyExists`.
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %registration.role))]
    pub async fn create(&self, registration: Registration) -> Result<Account, AccountError> {
        self.insert_registration(registration)
            .await
            .inspect_err(log_failure)
    }

    async fn insert_registration(&self, registration: Registration) -> Result<Account, AccountError> {
        if self.store.find_by_email(&registration.email).await?.is_some() {
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = self.hash_password(registration.password).await?;
        let record = self
            .store
            .insert(NewAccount {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: registration.role,
                created_at: Utc::now(),
            })
            .await?;

        info!(account_id = %record.id, "account created");
        Ok(record.redact())
    }

    /// Apply a partial update.
    ///
    /// An empty patch returns the current record without stamping
    /// `updated_at`.
    #[instrument(skip(self, patch), fields(account_id = %id))]
    pub async fn update(&self, id: AccountId, patch: AccountPatch) -> Result<Account, AccountError> {
        self.apply_patch(id, patch).await.inspect_err(log_failure)
    }

    async fn apply_patch(&self, id: AccountId, patch: AccountPatch) -> Result<Account, AccountError> {
        if patch.is_empty() {
            debug!("empty patch; returning current record");
            return self.get(id).await;
        }

        let changes = AccountChanges {
            name: patch.name,
            email: patch.email,
            role: patch.role,
            updated_at: Some(Utc::now()),
        };

        self.store
            .update(id, changes)
            .await?
            .map(|r| r.redact())
            .ok_or(AccountError::NotFound)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn delete(&self, id: AccountId) -> Result<Account, AccountError> {
        self.remove(id).await.inspect_err(log_failure)
    }

    async fn remove(&self, id: AccountId) -> Result<Account, AccountError> {
        let removed = self
            .store
            .delete(id)
            .await?
            .map(|r| r.redact())
            .ok_or(AccountError::NotFound)?;

        info!("account deleted");
        Ok(removed)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password are reported differently
    /// (`NotFound` vs `InvalidCredentials`).
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Account, AccountError> {
        self.check_credentials(credentials)
            .await
            .inspect_err(log_failure)
    }

    async fn check_credentials(&self, credentials: Credentials) -> Result<Account, AccountError> {
        let record = self
            .store
            .find_by_email(&credentials.email)
            .await?
            .ok_or(AccountError::NotFound)?;

        let hasher = Arc::clone(&self.hasher);
        let hash = record.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || {
            hasher.verify(&credentials.password, &hash)
        })
        .await
        .map_err(|e| AccountError::hashing(format!("verification task failed: {e}")))??;

        if !matches {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(record.redact())
    }

    /// Create `registration` unless its email is already registered.
    ///
    /// Returns the account and whether it was created by this call.
    pub async fn ensure(&self, registration: Registration) -> Result<(Account, bool), AccountError> {
        if let Some(existing) = self.store.find_by_email(&registration.email).await? {
            return Ok((existing.redact(), false));
        }
        match self.create(registration.clone()).await {
            Ok(account) => Ok((account, true)),
            Err(AccountError::AlreadyExists) => {
                let existing = self
                    .store
                    .find_by_email(&registration.email)
                    .await?
                    .ok_or(AccountError::NotFound)?;
                Ok((existing.redact(), false))
            }
            Err(e) => Err(e),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::hashing(format!("hashing task failed: {e}")))??;
        Ok(hash)
    }
}

/// Rejected input is expected traffic and logs at WARN; only hashing and
/// storage failures reach ERROR.
fn log_failure(err: &AccountError) {
    if err.is_infrastructure() {
        error!(code = err.code(), error = %err, "account operation failed");
    } else {
        warn!(code = err.code(), error = %err, "account operation rejected");
    }
}

impl core::fmt::Debug for AccountDirectory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountDirectory").finish_non_exhaustive()
    }
}
