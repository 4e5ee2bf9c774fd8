//! Postgres-backed account store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! The unique index on `lower(email)` is the real uniqueness guarantee; the
//! directory's pre-insert lookup only produces the friendlier error in the
//! common case.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::sync::Arc;
use tracing::{error, instrument, warn};

use userhub_core::{AccountId, Role};

use super::r#trait::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password TEXT NOT NULL,
        role VARCHAR(16) NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_idx ON users (lower(email))",
];

const COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `users` table and its indexes. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM users ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn insert(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))
        .inspect_err(log_write_error)?;

        record_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(account_id = %id))]
    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = COALESCE($5, updated_at)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.updated_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))
        .inspect_err(log_write_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn delete(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        let row = sqlx::query(&format!("DELETE FROM users WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        row.as_ref().map(record_from_row).transpose()
    }
}

fn record_from_row(row: &PgRow) -> Result<AccountRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Backend(format!("failed to decode user row: {e}"));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    Ok(AccountRecord {
        id: AccountId::new(id).map_err(|e| StoreError::Backend(e.to_string()))?,
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password").map_err(decode)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::Backend(format!("unknown role in users row: {e}")))?,
        created_at,
        updated_at,
    })
}

/// Email conflicts are ordinary rejections; anything else is a backend fault.
fn log_write_error(err: &StoreError) {
    match err {
        StoreError::Conflict(_) => warn!(error = %err, "write rejected by unique index"),
        StoreError::Backend(_) => error!(error = %err, "write failed"),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
