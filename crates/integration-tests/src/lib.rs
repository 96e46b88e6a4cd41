//! Integration tests for devhub.
//!
//! The tests in `tests/` talk to a running server over HTTP and are
//! `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! devhub-cli migrate
//! cargo run -p devhub-server &
//! DEVHUB_TEST_URL=http://localhost:5000 cargo test -p devhub-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Header carrying the access token.
pub use devhub_client::TOKEN_HEADER;

/// Server under test, from `DEVHUB_TEST_URL` (default `http://localhost:5000`).
#[must_use]
pub fn base_url() -> String {
    std::env::var("DEVHUB_TEST_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A unique email so repeated runs never collide on registration.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// HTTP client bound to the server under test.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url(),
        }
    }

    /// Send a JSON request and return the status with the decoded body
    /// (`Value::Null` when the body is not JSON).
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), reqwest::Error> {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}
