//! Token authentication extractor.
//!
//! The token is read from the `x-auth-token` header, or from
//! `Authorization: Bearer <token>` when that header is absent. A token is
//! only accepted while its account still exists.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use devhub_core::AccountId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Extractor that requires a valid access token for an existing account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, account {account}!")
/// }
/// ```
pub struct RequireAuth(pub AccountId);

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token.trim()).filter(|t| !t.is_empty());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or(AppError::Unauthorized("No token, authorization denied"))?;

        let account = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            AppError::Unauthorized("Token is not valid")
        })?;

        if state.accounts().find_by_id(account).await?.is_none() {
            tracing::debug!(%account, "Token for deleted account");
            return Err(AppError::Unauthorized("Token is not valid"));
        }

        set_sentry_user(&account);
        Ok(Self(account))
    }
}
