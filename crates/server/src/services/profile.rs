//! Profile service.
//!
//! Resolves the caller's profile, applies reconciled updates through the
//! store's atomic upsert, and edits the experience/education lists by
//! loading the document, changing it in memory and saving it back.

use std::collections::HashMap;

use thiserror::Error;
use tracing::instrument;

use devhub_core::{
    AccountId, EntryId, EntryNotFound, NewEducation, NewExperience, PopulatedProfile, Profile,
    ProfileUpdate,
};

use crate::db::{AccountStore, ProfileStore, RepositoryError};

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The authenticated account has not created a profile yet.
    #[error("there is no profile for this user")]
    NoProfile,

    /// No profile exists for the requested account.
    #[error("profile not found")]
    NotFound,

    /// The experience or education entry does not exist.
    #[error(transparent)]
    EntryNotFound(#[from] EntryNotFound),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Profile service.
pub struct ProfileService<'a> {
    accounts: &'a dyn AccountStore,
    profiles: &'a dyn ProfileStore,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountStore, profiles: &'a dyn ProfileStore) -> Self {
        Self { accounts, profiles }
    }

    /// Create or update the profile of `user` with the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Repository` if the store fails.
    #[instrument(skip(self, update), fields(fields = ?update.field_names()))]
    pub async fn upsert(
        &self,
        user: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Profile, ProfileError> {
        let profile = self.profiles.upsert(user, update).await?;
        tracing::info!(profile_id = %profile.id, "Profile saved");
        Ok(profile)
    }

    /// The caller's own profile with the owner embedded.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoProfile` if the caller has no profile.
    #[instrument(skip(self))]
    pub async fn my_profile(&self, user: AccountId) -> Result<PopulatedProfile, ProfileError> {
        let profile = self
            .profiles
            .find_by_account(user)
            .await?
            .ok_or(ProfileError::NoProfile)?;

        self.populate(profile)
            .await?
            .ok_or(ProfileError::NoProfile)
    }

    /// The profile of `user` with the owner embedded.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if `user` has no profile.
    #[instrument(skip(self))]
    pub async fn by_user(&self, user: AccountId) -> Result<PopulatedProfile, ProfileError> {
        let profile = self
            .profiles
            .find_by_account(user)
            .await?
            .ok_or(ProfileError::NotFound)?;

        self.populate(profile).await?.ok_or(ProfileError::NotFound)
    }

    /// Every profile with its owner embedded, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<PopulatedProfile>, ProfileError> {
        let profiles = self.profiles.list().await?;
        let ids: Vec<AccountId> = profiles.iter().map(|p| p.user).collect();

        let owners: HashMap<AccountId, _> = self
            .accounts
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|account| (account.id, account.summary()))
            .collect();

        Ok(profiles
            .into_iter()
            .filter_map(|profile| {
                let Some(owner) = owners.get(&profile.user) else {
                    tracing::warn!(profile_id = %profile.id, "Skipping profile without owner");
                    return None;
                };
                Some(profile.populate(owner.clone()))
            })
            .collect())
    }

    /// Delete the account of `user`; its profile goes with it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user: AccountId) -> Result<(), ProfileError> {
        self.accounts.delete(user).await?;
        tracing::info!("Account deleted");
        Ok(())
    }

    /// Add an experience entry to the top of the caller's list.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoProfile` if the caller has no profile.
    #[instrument(skip(self, entry))]
    pub async fn add_experience(
        &self,
        user: AccountId,
        entry: NewExperience,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.load_own(user).await?;
        profile.add_experience(entry);
        Ok(self.profiles.save(&profile).await?)
    }

    /// Remove one experience entry from the caller's list.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoProfile` if the caller has no profile.
    /// Returns `ProfileError::EntryNotFound` if no entry has that ID.
    #[instrument(skip(self))]
    pub async fn remove_experience(
        &self,
        user: AccountId,
        id: EntryId,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.load_own(user).await?;
        profile.remove_experience(id)?;
        Ok(self.profiles.save(&profile).await?)
    }

    /// Add an education entry to the top of the caller's list.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoProfile` if the caller has no profile.
    #[instrument(skip(self, entry))]
    pub async fn add_education(
        &self,
        user: AccountId,
        entry: NewEducation,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.load_own(user).await?;
        profile.add_education(entry);
        Ok(self.profiles.save(&profile).await?)
    }

    /// Remove one education entry from the caller's list.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoProfile` if the caller has no profile.
    /// Returns `ProfileError::EntryNotFound` if no entry has that ID.
    #[instrument(skip(self))]
    pub async fn remove_education(
        &self,
        user: AccountId,
        id: EntryId,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.load_own(user).await?;
        profile.remove_education(id)?;
        Ok(self.profiles.save(&profile).await?)
    }

    async fn load_own(&self, user: AccountId) -> Result<Profile, ProfileError> {
        self.profiles
            .find_by_account(user)
            .await?
            .ok_or(ProfileError::NoProfile)
    }

    async fn populate(&self, profile: Profile) -> Result<Option<PopulatedProfile>, ProfileError> {
        let owner = self.accounts.find_by_id(profile.user).await?;
        Ok(owner.map(|account| profile.populate(account.summary())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::NaiveDate;

    use devhub_core::{Email, EntryKind, NewAccount, ProfileInput};

    use std::sync::Arc;

    use super::*;
    use crate::db::memory::{self, MemoryAccountStore, MemoryProfileStore};

    struct Fixture {
        accounts: Arc<MemoryAccountStore>,
        profiles: Arc<MemoryProfileStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let (accounts, profiles) = memory::stores();
            Self { accounts, profiles }
        }

        fn service(&self) -> ProfileService<'_> {
            ProfileService::new(self.accounts.as_ref(), self.profiles.as_ref())
        }

        async fn account(&self, name: &str) -> AccountId {
            self.accounts
                .create(NewAccount {
                    name: name.to_string(),
                    email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
                    password_hash: "hash".to_string(),
                    avatar: format!("https://avatars.example.com/{name}"),
                })
                .await
                .unwrap()
                .id
        }
    }

    fn status(value: &str) -> ProfileUpdate {
        ProfileUpdate::from_input(&ProfileInput {
            status: Some(value.to_string()),
            skills: Some("rust, sql".to_string()),
            ..ProfileInput::default()
        })
    }

    fn job(title: &str) -> NewExperience {
        NewExperience {
            title: title.to_string(),
            company: "Initech".to_string(),
            location: None,
            from: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_my_profile_without_profile() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;

        let err = fx.service().my_profile(ada).await.unwrap_err();
        assert!(matches!(err, ProfileError::NoProfile));
    }

    #[tokio::test]
    async fn test_my_profile_is_populated() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;
        fx.service().upsert(ada, &status("Developer")).await.unwrap();

        let profile = fx.service().my_profile(ada).await.unwrap();
        assert_eq!(profile.user.name, "Ada");
        assert_eq!(profile.status.as_deref(), Some("Developer"));
    }

    #[tokio::test]
    async fn test_list_embeds_every_owner() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;
        let bob = fx.account("Bob").await;
        fx.service().upsert(ada, &status("Developer")).await.unwrap();
        fx.service().upsert(bob, &status("Student")).await.unwrap();

        let profiles = fx.service().list().await.unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.user.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Bob"]);
    }

    #[tokio::test]
    async fn test_by_user_unknown() {
        let fx = Fixture::new();
        let err = fx.service().by_user(AccountId::new(99)).await.unwrap_err();
        assert!(matches!(err, ProfileError::NotFound));
    }

    #[tokio::test]
    async fn test_experience_add_then_remove() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;
        let service = fx.service();
        service.upsert(ada, &status("Developer")).await.unwrap();

        service.add_experience(ada, job("Junior")).await.unwrap();
        let profile = service.add_experience(ada, job("Senior")).await.unwrap();
        assert_eq!(profile.experience[0].title, "Senior");

        let senior = profile.experience[0].id;
        let profile = service.remove_experience(ada, senior).await.unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].title, "Junior");
    }

    #[tokio::test]
    async fn test_remove_unknown_education() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;
        fx.service().upsert(ada, &status("Developer")).await.unwrap();

        let err = fx
            .service()
            .remove_education(ada, EntryId::generate())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::EntryNotFound(EntryNotFound {
                kind: EntryKind::Education,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_add_experience_requires_profile() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;

        let err = fx.service().add_experience(ada, job("Dev")).await.unwrap_err();
        assert!(matches!(err, ProfileError::NoProfile));
    }

    #[tokio::test]
    async fn test_delete_account_removes_both() {
        let fx = Fixture::new();
        let ada = fx.account("Ada").await;
        fx.service().upsert(ada, &status("Developer")).await.unwrap();

        fx.service().delete_account(ada).await.unwrap();

        assert!(fx.accounts.find_by_id(ada).await.unwrap().is_none());
        assert!(fx.profiles.find_by_account(ada).await.unwrap().is_none());
    }
}
