//! devhub client - HTTP access to the devhub API.
//!
//! [`ApiClient`] carries the base URL and the access token. Its action
//! creators report their outcome to a [`Dispatch`] receiver instead of
//! returning it, so UI code can feed them straight into a store:
//!
//! ```rust,ignore
//! let client = ApiClient::new("http://localhost:5000")?;
//! let token = client.login("ada@example.com", "correct horse").await?;
//!
//! let mut actions = Vec::new();
//! client.with_token(token).get_current_profile(&mut actions).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;

pub use actions::{Dispatch, ProfileAction};

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Errors returned by direct (non-dispatching) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: serde_json::Value },
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// devhub API client.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Use `token` for authenticated requests.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    /// Log in and return the issued token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the response body for rejected
    /// credentials, `ClientError::Http` for transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/api/auth"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json().await.unwrap_or(serde_json::Value::Null);
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let TokenResponse { token } = response.json().await?;
        Ok(token)
    }

    /// Fetch the current user's profile and dispatch the outcome.
    ///
    /// Dispatches exactly one action: [`ProfileAction::GetProfile`] on
    /// success, [`ProfileAction::ProfileError`] otherwise.
    pub async fn get_current_profile(&self, dispatch: &mut impl Dispatch) {
        let request = self.authorized(self.client.get(self.url("/api/profile/me")));
        dispatch.dispatch(Self::profile_outcome(request.send().await).await);
    }

    async fn profile_outcome(
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> ProfileAction {
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Profile request failed");
                return ProfileAction::ProfileError {
                    msg: e.to_string(),
                    status: None,
                };
            }
        };

        let status = response.status();
        let error = || ProfileAction::ProfileError {
            msg: status.canonical_reason().unwrap_or_default().to_string(),
            status: Some(status.as_u16()),
        };

        if !status.is_success() {
            return error();
        }

        match response.json().await {
            Ok(profile) => ProfileAction::GetProfile(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Profile response was not JSON");
                error()
            }
        }
    }
}
