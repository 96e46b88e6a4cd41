//! GitHub REST API client for a developer's latest repositories.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use crate::config::GithubConfig;

/// Number of repositories returned per lookup.
const REPO_COUNT: &str = "5";

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub returned {status} for {username}")]
    Api { status: u16, username: String },
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a new GitHub API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("devhub-server"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// The five most recently created public repositories of `username`, as
    /// returned by GitHub.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::Api` for any non-200 answer and
    /// `GithubError::Http` when GitHub cannot be reached.
    #[instrument(skip(self))]
    pub async fn latest_repos(&self, username: &str) -> Result<serde_json::Value, GithubError> {
        let url = format!(
            "{}/users/{}/repos",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(username)
        );

        let mut query = vec![("per_page", REPO_COUNT), ("sort", "created:asc")];
        if let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) {
            query.push(("client_id", id.as_str()));
            query.push(("client_secret", secret.expose_secret()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "GitHub lookup failed");
            return Err(GithubError::Api {
                status: status.as_u16(),
                username: username.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;

    use super::*;

    async fn stub_github() -> String {
        async fn repos(
            Path(user): Path<String>,
            Query(query): Query<HashMap<String, String>>,
        ) -> Result<axum::Json<serde_json::Value>, StatusCode> {
            if user != "octocat" {
                return Err(StatusCode::NOT_FOUND);
            }
            Ok(axum::Json(json!([
                { "name": "hello-world", "per_page": query.get("per_page") },
                { "name": "spoon-knife", "sort": query.get("sort") }
            ])))
        }

        let app = Router::new().route("/users/{user}/repos", get(repos));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(api_url: String) -> GithubClient {
        GithubClient::new(&GithubConfig {
            api_url,
            ..GithubConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_repos_passes_json_through() {
        let github = client(stub_github().await);

        let repos = github.latest_repos("octocat").await.unwrap();
        assert_eq!(repos[0]["name"], "hello-world");
        assert_eq!(repos[0]["per_page"], "5");
        assert_eq!(repos[1]["sort"], "created:asc");
    }

    #[tokio::test]
    async fn test_unknown_user_is_api_error() {
        let github = client(stub_github().await);

        let err = github.latest_repos("nobody").await.unwrap_err();
        assert!(matches!(err, GithubError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let github = client("http://127.0.0.1:1".to_string());

        let err = github.latest_repos("octocat").await.unwrap_err();
        assert!(matches!(err, GithubError::Http(_)));
    }
}
