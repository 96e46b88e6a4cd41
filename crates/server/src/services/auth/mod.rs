//! Authentication service.
//!
//! Password registration and login over an [`AccountStore`], issuing signed
//! tokens through [`TokenKeys`].

mod error;
pub mod token;

pub use error::AuthError;
pub use token::TokenKeys;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};
use tracing::instrument;

use devhub_core::{Account, AccountId, Email, NewAccount};

use crate::db::{AccountStore, RepositoryError};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A freshly registered account and its first token.
#[derive(Debug)]
pub struct Registration {
    pub account: Account,
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    accounts: &'a dyn AccountStore,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountStore, tokens: &'a TokenKeys) -> Self {
        Self { accounts, tokens }
    }

    /// Register a new account and sign a token for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AccountExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AccountExists);
        }

        let account = self
            .accounts
            .create(NewAccount {
                name: name.trim().to_string(),
                avatar: gravatar_url(&email),
                email,
                password_hash: hash_password(password)?,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(account.id)?;
        tracing::info!(account_id = %account.id, "Account registered");

        Ok(Registration { account, token })
    }

    /// Check an email/password pair and sign a token for the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(self.tokens.issue(account.id)?)
    }

    /// The account a verified token refers to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account has been deleted.
    #[instrument(skip(self))]
    pub async fn current_account(&self, id: AccountId) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}

/// Gravatar image for `email`: 200px, PG-rated, "mystery person" fallback.
#[must_use]
pub fn gravatar_url(email: &Email) -> String {
    let digest = Sha256::digest(email.as_str().trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=mm")
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::AuthConfig;
    use crate::db::memory::MemoryAccountStore;

    fn token_keys() -> TokenKeys {
        TokenKeys::new(&AuthConfig {
            jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%".to_string()),
            token_ttl_secs: 3600,
        })
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_gravatar_url_normalizes_email() {
        let a = gravatar_url(&Email::parse("Ada@Example.com").unwrap());
        let b = gravatar_url(&Email::parse("ada@example.com").unwrap());

        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&r=pg&d=mm"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryAccountStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);

        let reg = auth
            .register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(keys.verify(&reg.token).unwrap(), reg.account.id);
        assert_ne!(reg.account.password_hash, "correct horse");

        let token = auth.login("ADA@example.com", "correct horse").await.unwrap();
        assert_eq!(keys.verify(&token).unwrap(), reg.account.id);
    }

    #[tokio::test]
    async fn test_register_existing_email() {
        let store = MemoryAccountStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);

        auth.register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();
        let err = auth
            .register("Other", "ada@example.com", "another password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountExists));
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_which_part_failed() {
        let store = MemoryAccountStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);
        auth.register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();

        let unknown = auth.login("bob@example.com", "correct horse").await;
        let wrong = auth.login("ada@example.com", "wrong horse").await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_current_account_after_delete() {
        let store = MemoryAccountStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);
        let reg = auth
            .register("Ada", "ada@example.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(auth.current_account(reg.account.id).await.unwrap().name, "Ada");
        store.delete(reg.account.id).await.unwrap();
        assert!(matches!(
            auth.current_account(reg.account.id).await,
            Err(AuthError::AccountNotFound)
        ));
    }
}
