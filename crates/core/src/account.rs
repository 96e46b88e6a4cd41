//! Account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Email};

/// A registered account.
///
/// `password_hash` is never serialized; responses that return an account
/// (e.g. `GET /api/auth`) therefore never leak it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The public part of the account embedded in profile reads.
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Data needed to create an account. The store assigns the ID and timestamp.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub avatar: String,
}

/// Name and avatar of a profile's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub name: String,
    pub avatar: String,
}
