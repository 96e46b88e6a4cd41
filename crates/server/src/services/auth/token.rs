//! Signed access tokens.
//!
//! Tokens are HS256 JWTs whose payload names the account under `user.id`:
//!
//! ```json
//! { "user": { "id": 7 }, "iat": 1700000000, "exp": 1700360000 }
//! ```

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use devhub_core::AccountId;

use crate::config::AuthConfig;

/// The account a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: AccountId,
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    /// Build keys from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret_bytes()),
            decoding: DecodingKey::from_secret(config.secret_bytes()),
            ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `account`.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if encoding fails.
    pub fn issue(&self, account: AccountId) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user: TokenUser { id: account },
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token's signature and expiry and return the account it names.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error for malformed, tampered or expired tokens.
    pub fn verify(&self, token: &str) -> Result<AccountId, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims.user.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn keys(secret: &str, ttl_secs: u64) -> TokenKeys {
        TokenKeys::new(&AuthConfig {
            jwt_secret: SecretString::from(secret.to_string()),
            token_ttl_secs: ttl_secs,
        })
    }

    #[test]
    fn test_issued_token_verifies() {
        let keys = keys("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", 3600);
        let token = keys.issue(AccountId::new(42)).unwrap();

        assert_eq!(keys.verify(&token).unwrap(), AccountId::new(42));
    }

    #[test]
    fn test_claims_name_the_user() {
        let keys = keys("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", 3600);
        let token = keys.issue(AccountId::new(5)).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let data = jsonwebtoken::decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims["user"]["id"], 5);
        let iat = data.claims["iat"].as_i64().unwrap();
        let exp = data.claims["exp"].as_i64().unwrap();
        assert_eq!(exp - iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = keys("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", 3600);
        let other = keys("Zq8#Lm4!Tx1@Vb7$Nc2%Hd9^Kf3&Wg6*", 3600);
        let token = issuer.issue(AccountId::new(1)).unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", 0);
        let now = Utc::now().timestamp();
        let claims = Claims {
            user: TokenUser {
                id: AccountId::new(1),
            },
            iat: now - 7200,
            exp: now - 3600,
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = keys("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%", 3600);
        assert!(keys.verify("not.a.token").is_err());
    }
}
