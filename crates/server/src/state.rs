//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{AccountStore, PgAccountStore, PgProfileStore, ProfileStore};
use crate::services::auth::{AuthService, TokenKeys};
use crate::services::github::{GithubClient, GithubError};
use crate::services::profile::ProfileService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, token keys and the GitHub client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    accounts: Arc<dyn AccountStore>,
    profiles: Arc<dyn ProfileStore>,
    tokens: TokenKeys,
    github: GithubClient,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub HTTP client cannot be built.
    pub fn new(config: &ServerConfig, pool: PgPool) -> Result<Self, GithubError> {
        let accounts = Arc::new(PgAccountStore::new(pool.clone()));
        let profiles = Arc::new(PgProfileStore::new(pool));
        Self::with_stores(config, accounts, profiles)
    }

    /// Create application state over arbitrary stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub HTTP client cannot be built.
    pub fn with_stores(
        config: &ServerConfig,
        accounts: Arc<dyn AccountStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Result<Self, GithubError> {
        let tokens = TokenKeys::new(&config.auth);
        let github = GithubClient::new(&config.github)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                accounts,
                profiles,
                tokens,
                github,
            }),
        })
    }

    /// Get a reference to the account store.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }

    /// Get a reference to the token keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Get a reference to the GitHub API client.
    #[must_use]
    pub fn github(&self) -> &GithubClient {
        &self.inner.github
    }

    /// Authentication service over this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.inner.accounts.as_ref(), &self.inner.tokens)
    }

    /// Profile service over this state's stores.
    #[must_use]
    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(self.inner.accounts.as_ref(), self.inner.profiles.as_ref())
    }
}
