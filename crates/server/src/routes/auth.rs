//! Login and current-account lookup.

use axum::{Json, extract::State};
use serde::Deserialize;

use devhub_core::{Account, Validator};

use super::users::TokenResponse;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `GET /api/auth`
pub async fn current_account(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<Json<Account>> {
    Ok(Json(state.auth().current_account(account).await?))
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<TokenResponse>> {
    let mut v = Validator::new();
    v.email("email", input.email.as_deref(), "Please use a valid email")
        .exists("password", input.password.as_deref(), "Password is required");
    v.finish()?;

    let token = state
        .auth()
        .login(
            input.email.as_deref().unwrap_or_default(),
            input.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(TokenResponse { token }))
}
