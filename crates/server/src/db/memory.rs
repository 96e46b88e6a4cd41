//! In-process stores.
//!
//! Same contracts as the `PostgreSQL` stores, kept in `RwLock`-guarded maps.
//! The router tests run against these so they need no database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use devhub_core::{Account, AccountId, Email, NewAccount, Profile, ProfileId, ProfileUpdate};

use super::{AccountStore, ProfileStore, RepositoryError};

struct Table<T> {
    next_id: i32,
    rows: HashMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    const fn allocate(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Account store held in memory.
#[derive(Default)]
pub struct MemoryAccountStore {
    table: RwLock<Table<Account>>,
    profiles: Option<Arc<MemoryProfileStore>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account store whose deletes also remove the owner's profile from
    /// `profiles`, matching the `ON DELETE CASCADE` foreign key.
    #[must_use]
    pub fn cascading_to(profiles: Arc<MemoryProfileStore>) -> Self {
        Self {
            table: RwLock::default(),
            profiles: Some(profiles),
        }
    }
}

/// A linked pair of stores for one in-process app.
#[must_use]
pub fn stores() -> (Arc<MemoryAccountStore>, Arc<MemoryProfileStore>) {
    let profiles = Arc::new(MemoryProfileStore::new());
    let accounts = Arc::new(MemoryAccountStore::cascading_to(Arc::clone(&profiles)));
    (accounts, profiles)
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|a| &a.email == email).cloned())
    }

    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, RepositoryError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(&id.as_i32()).cloned())
            .collect())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }

        let id = table.allocate();
        let created = Account {
            id: AccountId::new(id),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            avatar: account.avatar,
            created_at: Utc::now(),
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id.as_i32()).is_none() {
            return Ok(false);
        }
        if let Some(profiles) = &self.profiles {
            profiles.remove_owned_by(id).await;
        }
        Ok(true)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Profile store held in memory, keyed by profile ID.
#[derive(Default)]
pub struct MemoryProfileStore {
    table: RwLock<Table<Profile>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn remove_owned_by(&self, user: AccountId) {
        self.table.write().await.rows.retain(|_, p| p.user != user);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_by_account(&self, user: AccountId) -> Result<Option<Profile>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.user == user).cloned())
    }

    async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let table = self.table.read().await;
        let mut profiles: Vec<Profile> = table.rows.values().cloned().collect();
        profiles.sort_by_key(|p| p.id);
        Ok(profiles)
    }

    async fn upsert(
        &self,
        user: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        // The write guard is held across lookup and insert, so concurrent
        // upserts for one account cannot create two profiles.
        let mut table = self.table.write().await;

        if let Some(existing) = table.rows.values_mut().find(|p| p.user == user) {
            update.apply_to(existing);
            return Ok(existing.clone());
        }

        let id = table.allocate();
        let profile = update
            .clone()
            .into_profile(ProfileId::new(id), user, Utc::now());
        table.rows.insert(id, profile.clone());
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&profile.id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        stored.clone_from(profile);
        Ok(stored.clone())
    }
}
