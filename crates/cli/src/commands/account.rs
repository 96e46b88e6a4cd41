//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! devhub-cli account create -n "Ada Lovelace" -e ada@example.com -p "correct horse"
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DEVHUB_DATABASE_URL` and `DEVHUB_JWT_SECRET` are
//! required.

use thiserror::Error;

use devhub_core::AccountId;
use devhub_server::config::{ConfigError, ServerConfig};
use devhub_server::db::{self, PgAccountStore};
use devhub_server::services::auth::{AuthError, AuthService, TokenKeys};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Registration was rejected.
    #[error("Registration failed: {0}")]
    Auth(#[from] AuthError),
}

/// Register an account with a password.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns error if configuration is missing, the database is unreachable,
/// or the email/password is rejected.
pub async fn create(name: &str, email: &str, password: &str) -> Result<AccountId, AccountError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    let accounts = PgAccountStore::new(pool);
    let tokens = TokenKeys::new(&config.auth);

    let registration = AuthService::new(&accounts, &tokens)
        .register(name, email, password)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}",
        registration.account.id,
        registration.account.email
    );

    Ok(registration.account.id)
}
