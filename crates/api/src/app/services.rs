//! Service wiring and account orchestration.
//!
//! `AccountService` is the one place that sequences id parsing, input
//! validation, the access policy and the directory for each operation.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use userhub_auth::{AccountOperation, Argon2Hasher, Identity, TokenService};
use userhub_core::validate::{
    RegistrationInput, UpdateInput, validate_credentials, validate_patch, validate_registration,
};
use userhub_core::{Account, AccountError, AccountId, Role};
use userhub_infra::{AccountDirectory, AccountStore, InMemoryAccountStore, PostgresAccountStore};

use crate::authz;
use crate::config::{ApiConfig, BootstrapAdmin};
use crate::context::RequestIdentity;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub tokens: Arc<TokenService>,
    pub secure_cookies: bool,
}

/// An account plus a freshly issued token for it.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: Account,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    directory: AccountDirectory,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(directory: AccountDirectory, tokens: Arc<TokenService>) -> Self {
        Self { directory, tokens }
    }

    /// Every account. Not gated: the directory is readable by anyone.
    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        self.directory.list().await
    }

    pub async fn get(&self, raw_id: &str) -> Result<Account, AccountError> {
        let id: AccountId = raw_id.parse()?;
        self.directory.get(id).await
    }

    /// Input is validated before the policy runs, so malformed requests are
    /// rejected the same way whoever sends them.
    pub async fn update(
        &self,
        identity: &RequestIdentity,
        raw_id: &str,
        input: UpdateInput,
    ) -> Result<Account, AccountError> {
        let (id, patch) = match (raw_id.parse::<AccountId>(), validate_patch(input)) {
            (Ok(id), Ok(patch)) => (id, patch),
            (id, patch) => return Err(merge_validation(id.err(), patch.err())),
        };

        authz::authorize_account_operation(identity, id, AccountOperation::Update { patch: &patch })?;

        let account = self.directory.update(id, patch).await?;
        info!(account_id = %account.id, "account updated");
        Ok(account)
    }

    pub async fn delete(
        &self,
        identity: &RequestIdentity,
        raw_id: &str,
    ) -> Result<Account, AccountError> {
        let id: AccountId = raw_id.parse()?;
        authz::authorize_account_operation(identity, id, AccountOperation::Delete)?;
        self.directory.delete(id).await
    }

    pub async fn register(
        &self,
        identity: &RequestIdentity,
        input: RegistrationInput,
    ) -> Result<SignedIn, AccountError> {
        let registration = validate_registration(input)?;
        authz::authorize_new_account(identity, registration.role)?;

        let account = self.directory.create(registration).await?;
        self.sign_in(account)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SignedIn, AccountError> {
        let credentials = validate_credentials(email, password)?;
        let account = self.directory.authenticate(credentials).await?;
        info!(account_id = %account.id, "account signed in");
        self.sign_in(account)
    }

    /// Create the configured admin account unless its email is taken.
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<Account, AccountError> {
        let registration = validate_registration(RegistrationInput {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            role: Some("admin".to_string()),
        })?;

        let (account, created) = self.directory.ensure(registration).await?;
        if created {
            info!(account_id = %account.id, "bootstrap admin created");
        } else if account.role != Role::Admin {
            warn!(
                account_id = %account.id,
                role = %account.role,
                "bootstrap admin email belongs to a non-admin account; leaving it unchanged"
            );
        } else {
            info!(account_id = %account.id, "bootstrap admin already present");
        }
        Ok(account)
    }

    fn sign_in(&self, account: Account) -> Result<SignedIn, AccountError> {
        let token = self.tokens.issue(&Identity::from(&account))?;
        Ok(SignedIn { account, token })
    }
}

fn merge_validation(id: Option<AccountError>, body: Option<AccountError>) -> AccountError {
    match (id, body) {
        (Some(AccountError::ValidationFailed(mut a)), Some(AccountError::ValidationFailed(b))) => {
            a.extend(b);
            AccountError::ValidationFailed(a)
        }
        (Some(e), _) | (None, Some(e)) => e,
        (None, None) => AccountError::validation("body", "invalid request"),
    }
}

/// Build application services from configuration.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn AccountStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresAccountStore::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            info!("using postgres account store");
            Arc::new(store)
        }
        None => {
            info!("DATABASE_URL not set; using in-memory account store");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let hasher = Argon2Hasher::new(config.hashing).context("invalid argon2 parameters")?;
    let tokens = Arc::new(TokenService::new(&config.signing_secret, config.token_ttl));
    let accounts = AccountService::new(
        AccountDirectory::new(store, Arc::new(hasher)),
        Arc::clone(&tokens),
    );

    if let Some(admin) = &config.bootstrap_admin {
        accounts
            .bootstrap_admin(admin)
            .await
            .context("failed to bootstrap admin account")?;
    }

    Ok(AppServices {
        accounts,
        tokens,
        secure_cookies: config.environment.is_production(),
    })
}
