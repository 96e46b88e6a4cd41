//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] devhub_core::EmailError),

    /// Unknown email or wrong password. The two are deliberately not told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    AccountExists,

    /// Password too short.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account a valid token refers to no longer exists.
    #[error("account not found")]
    AccountNotFound,

    /// Token could not be issued or failed verification.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
