//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server errors are captured to
//! Sentry before responding; clients only ever see `Server Error` for them.
//!
//! # Response bodies
//!
//! | Kind | Status | Body |
//! |---|---|---|
//! | validation | 400 | `{"errors":[{"msg","param","location"}]}` |
//! | credentials / duplicate account | 400 | `{"errors":[{"msg"}]}` |
//! | missing profile | 400 | `{"msg"}` |
//! | missing experience/education entry | 500 | `{"msg"}` |
//! | missing or bad token | 401 | `{"msg"}` |
//! | GitHub lookup | 404 | `{"msg"}` |
//! | store / internal | 500 | `Server Error` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use devhub_core::{EntryKind, FieldError, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::github::GithubError;
use crate::services::profile::ProfileError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// GitHub lookup failed.
    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Missing or rejected token.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The entry ID in the path cannot name any entry.
    #[error("Malformed {} ID", .0.label())]
    MalformedEntryId(EntryKind),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body for errors reported under `errors` without a field name.
fn errors_msg(msg: &str) -> serde_json::Value {
    json!({ "errors": [{ "msg": msg }] })
}

fn msg(msg: &str) -> serde_json::Value {
    json!({ "msg": msg })
}

/// Unknown entries answer 500 with a message naming the kind.
fn missing_entry(kind: EntryKind) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        msg(&format!("{} not found", kind.label())),
    )
}

impl AppError {
    /// Status and JSON body for client errors; `None` for server errors.
    fn client_response(&self) -> Option<(StatusCode, serde_json::Value)> {
        let response = match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidEmail(_) => {
                    (StatusCode::BAD_REQUEST, errors_msg("Invalid Credentials"))
                }
                AuthError::AccountExists => {
                    (StatusCode::BAD_REQUEST, errors_msg("User already exists"))
                }
                AuthError::WeakPassword(_) => (
                    StatusCode::BAD_REQUEST,
                    json!(ValidationErrors {
                        errors: vec![FieldError {
                            msg: "Please enter a password of 8 or more characters".to_string(),
                            param: "password".to_string(),
                            location: "body",
                        }],
                    }),
                ),
                AuthError::AccountNotFound => {
                    (StatusCode::UNAUTHORIZED, msg("Token is not valid"))
                }
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    return None;
                }
            },
            Self::Profile(err) => match err {
                ProfileError::NoProfile => (
                    StatusCode::BAD_REQUEST,
                    msg("There is no profile for this user"),
                ),
                ProfileError::NotFound => (StatusCode::BAD_REQUEST, msg("Profile not found")),
                ProfileError::EntryNotFound(missing) => missing_entry(missing.kind),
                ProfileError::Repository(_) => return None,
            },
            Self::Github(_) => (StatusCode::NOT_FOUND, msg("No Github Profile found")),
            Self::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, msg(reason)),
            Self::NotFound(what) => (StatusCode::BAD_REQUEST, msg(what)),
            Self::MalformedEntryId(kind) => missing_entry(*kind),
            Self::Database(_) | Self::Internal(_) => return None,
        };
        Some(response)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some((status, body)) = self.client_response() {
            return (status, Json(body)).into_response();
        }

        // Capture server errors to Sentry
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context to the authenticated account.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use devhub_core::{EntryId, EntryKind, EntryNotFound, Validator};

    use super::*;

    async fn parts(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn json_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let (status, body) = parts(err).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Profile not found".to_string());
        assert_eq!(err.to_string(), "Not found: Profile not found");
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let mut v = Validator::new();
        v.required("status", None, "Status is required");
        let err = AppError::from(v.finish().unwrap_err());

        let (status, body) = json_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["param"], "status");
        assert_eq!(body["errors"][0]["location"], "body");
    }

    #[tokio::test]
    async fn test_credentials_do_not_enumerate() {
        let (status, body) = json_parts(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": [{ "msg": "Invalid Credentials" }] }));
    }

    #[tokio::test]
    async fn test_duplicate_account() {
        let (status, body) = json_parts(AuthError::AccountExists.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["msg"], "User already exists");
    }

    #[tokio::test]
    async fn test_missing_entry_message() {
        let err = ProfileError::EntryNotFound(EntryNotFound {
            kind: EntryKind::Experience,
            id: EntryId::generate(),
        });
        let (status, body) = json_parts(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "msg": "Experience not found" }));

        let (status, body) = json_parts(AppError::MalformedEntryId(EntryKind::Education)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "msg": "Education not found" }));
    }

    #[tokio::test]
    async fn test_unauthorized_body() {
        let (status, body) = json_parts(AppError::Unauthorized("No token, authorization denied")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["msg"], "No token, authorization denied");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = parts(AppError::Internal("pool exhausted".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Server Error");

        let err = AppError::Profile(ProfileError::Repository(RepositoryError::NotFound));
        let (status, body) = parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("not found"));
    }
}
