//! Account and profile persistence.
//!
//! # Database: `devhub`
//!
//! ## Tables
//!
//! - `account` - Credentials, display name and avatar
//! - `profile` - One document per account; `social`, `experience` and
//!   `education` are JSONB, `skills` is `TEXT[]`
//!
//! # Stores
//!
//! Handlers and services talk to the [`AccountStore`] and [`ProfileStore`]
//! traits. [`accounts::PgAccountStore`] and [`profiles::PgProfileStore`] back
//! them with `PostgreSQL`; [`memory`] provides in-process stores used by the
//! route tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p devhub-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;
pub mod profiles;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use devhub_core::{Account, AccountId, Email, NewAccount, Profile, ProfileUpdate};

pub use accounts::PgAccountStore;
pub use profiles::PgProfileStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Credential store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by ID.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by (normalized) email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up several accounts at once. Unknown IDs are skipped.
    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, RepositoryError>;

    /// Create an account.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Delete an account together with its profile. Returns `false` if it
    /// did not exist.
    async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError>;

    /// Connectivity check used by `/health/ready`.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Profile store. At most one profile exists per account.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The profile owned by `user`, if any.
    async fn find_by_account(&self, user: AccountId) -> Result<Option<Profile>, RepositoryError>;

    /// Every profile, oldest first.
    async fn list(&self) -> Result<Vec<Profile>, RepositoryError>;

    /// Merge `update` into the profile of `user`, creating the profile if it
    /// does not exist yet. Runs as one atomic operation.
    async fn upsert(
        &self,
        user: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError>;

    /// Persist the whole document, including its entry lists.
    ///
    /// Returns `RepositoryError::NotFound` if the profile no longer exists.
    async fn save(&self, profile: &Profile) -> Result<Profile, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
