//! Account registration.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use devhub_core::Validator;

use crate::error::Result;
use crate::extract::JsonBody;
use crate::services::auth::MIN_PASSWORD_LENGTH;
use crate::state::AppState;

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A freshly signed access token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /api/users`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> Result<Json<TokenResponse>> {
    let mut v = Validator::new();
    v.required("name", input.name.as_deref(), "Name is required")
        .email("email", input.email.as_deref(), "Please use a valid email")
        .min_len(
            "password",
            input.password.as_deref(),
            MIN_PASSWORD_LENGTH,
            "Please enter a password of 8 or more characters",
        );
    v.finish()?;

    let registration = state
        .auth()
        .register(
            input.name.as_deref().unwrap_or_default(),
            input.email.as_deref().unwrap_or_default(),
            input.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(TokenResponse {
        token: registration.token,
    }))
}
