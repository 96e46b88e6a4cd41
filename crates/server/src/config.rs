//! Server configuration loaded from environment variables.
//!
//! The configuration is built once in `main` and handed to
//! [`AppState`](crate::state::AppState); nothing reads the environment after
//! start-up.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DEVHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `DEVHUB_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `DEVHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `DEVHUB_PORT` - Listen port (default: 5000)
//! - `DEVHUB_TOKEN_TTL_SECS` - Token lifetime in seconds (default: 360000)
//! - `GITHUB_API_URL` - GitHub REST API base (default: <https://api.github.com>)
//! - `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` - OAuth app credentials for higher rate limits
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_SECS: u64 = 360_000;
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "jwtsecret",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// GitHub repository lookup configuration
    pub github: GithubConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: SecretString,
    /// How long an issued token stays valid, in seconds
    pub token_ttl_secs: u64,
}

/// GitHub REST API configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GithubConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    /// OAuth app client ID
    pub client_id: Option<String>,
    /// OAuth app client secret
    pub client_secret: Option<SecretString>,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("DEVHUB_DATABASE_URL")?;
        let host = parse_env("DEVHUB_HOST", "127.0.0.1")?;
        let port = parse_env("DEVHUB_PORT", "5000")?;

        Ok(Self {
            database_url,
            host,
            port,
            auth: AuthConfig::from_env()?,
            github: GithubConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_required_env("DEVHUB_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "DEVHUB_JWT_SECRET")?;
        let token_ttl_secs = parse_env(
            "DEVHUB_TOKEN_TTL_SECS",
            &DEFAULT_TOKEN_TTL_SECS.to_string(),
        )?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_secs,
        })
    }
}

impl GithubConfig {
    fn from_env() -> Self {
        Self {
            api_url: get_env_or_default("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)
                .trim_end_matches('/')
                .to_string(),
            client_id: get_optional_env("GITHUB_CLIENT_ID"),
            client_secret: get_optional_env("GITHUB_CLIENT_SECRET").map(SecretString::from),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable; empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that the signing secret is long, not a placeholder, and random-looking.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

impl AuthConfig {
    /// Expose the signing secret bytes for key construction.
    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_jwt_secret_too_short() {
        let err = validate_jwt_secret("aB3$xY9!", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_jwt_secret_placeholder() {
        let err = validate_jwt_secret("mysecrettoken-mysecrettoken-1234567", "TEST_VAR").unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_jwt_secret_low_entropy() {
        let err = validate_jwt_secret(&"ab".repeat(20), "TEST_VAR").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_jwt_secret_valid() {
        assert!(validate_jwt_secret(STRONG_SECRET, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_env_default() {
        let port: u16 = parse_env("DEVHUB_TEST_UNSET_PORT_VAR", "5000").unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/devhub"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            auth: AuthConfig {
                jwt_secret: SecretString::from(STRONG_SECRET),
                token_ttl_secs: 3600,
            },
            github: GithubConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_github_config_debug_redacts_secret() {
        let config = GithubConfig {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            client_id: Some("client_id_value".to_string()),
            client_secret: Some(SecretString::from("super_secret_client_secret")),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
    }
}
