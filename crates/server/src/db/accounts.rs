//! `PostgreSQL` account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use devhub_core::{Account, AccountId, Email, NewAccount};

use super::{AccountStore, RepositoryError};

/// Row shape shared by every account query.
#[derive(FromRow)]
struct AccountRow {
    id: AccountId,
    name: String,
    email: Email,
    password_hash: String,
    avatar: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            avatar: row.avatar,
            created_at: row.created_at,
        }
    }
}

/// Account store backed by the `devhub.account` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM devhub.account
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM devhub.account
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(AccountId::as_i32).collect();
        let rows = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM devhub.account
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO devhub.account (name, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, avatar, created_at
            ",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM devhub.account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
