//! Profile documents and their ordered entry lists.
//!
//! A [`Profile`] is owned by exactly one account and carries two ordered
//! sub-collections: experience and education. Both lists are kept newest
//! first: inserting puts the entry at index 0, so reading a list back gives
//! reverse insertion order. Removal is by [`EntryId`] and reports
//! [`EntryNotFound`] without touching the list when no entry matches.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, AccountSummary, EntryId, ProfileId};

/// Links to the owner's social accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl SocialLinks {
    /// Returns `true` when no link is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.youtube.is_none()
            && self.twitter.is_none()
            && self.facebook.is_none()
            && self.linkedin.is_none()
            && self.instagram.is_none()
    }
}

/// A job in the owner's work history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A validated experience submission, before an ID is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// A school in the owner's education history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: EntryId,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A validated education submission, before an ID is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// Which sub-collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Experience,
    Education,
}

impl EntryKind {
    /// Capitalized label used in client-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Experience => "Experience",
            Self::Education => "Education",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Experience => f.write_str("experience"),
            Self::Education => f.write_str("education"),
        }
    }
}

/// No entry with the requested ID exists in the list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} entry {id} not found")]
pub struct EntryNotFound {
    pub kind: EntryKind,
    pub id: EntryId,
}

/// An element of an ordered profile sub-collection.
pub trait Entry {
    /// The list this entry type lives in.
    const KIND: EntryKind;

    /// The entry's identifier.
    fn id(&self) -> EntryId;
}

impl Entry for ExperienceEntry {
    const KIND: EntryKind = EntryKind::Experience;

    fn id(&self) -> EntryId {
        self.id
    }
}

impl Entry for EducationEntry {
    const KIND: EntryKind = EntryKind::Education;

    fn id(&self) -> EntryId {
        self.id
    }
}

/// Put `entry` at the head of `list`.
fn insert_newest<T: Entry>(list: &mut Vec<T>, entry: T) -> EntryId {
    let id = entry.id();
    list.insert(0, entry);
    id
}

/// Remove the entry whose ID is `id`, leaving `list` untouched if none matches.
fn remove_by_id<T: Entry>(list: &mut Vec<T>, id: EntryId) -> Result<T, EntryNotFound> {
    let index = list
        .iter()
        .position(|entry| entry.id() == id)
        .ok_or(EntryNotFound { kind: T::KIND, id })?;
    Ok(list.remove(index))
}

/// A profile document.
///
/// `U` is the owner representation: the bare [`AccountId`] as stored, or an
/// [`AccountSummary`] once the owner has been looked up (see
/// [`PopulatedProfile`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile<U = AccountId> {
    pub id: ProfileId,
    pub user: U,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    pub date: DateTime<Utc>,
}

/// A profile with its owner's name and avatar embedded under `user`.
pub type PopulatedProfile = Profile<AccountSummary>;

impl Profile {
    /// An empty profile for `user`.
    #[must_use]
    pub fn empty(id: ProfileId, user: AccountId, date: DateTime<Utc>) -> Self {
        Self {
            id,
            user,
            company: None,
            website: None,
            location: None,
            bio: None,
            status: None,
            githubusername: None,
            skills: Vec::new(),
            social: SocialLinks::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date,
        }
    }

    /// Replace the owner ID with the owner's summary.
    #[must_use]
    pub fn populate(self, owner: AccountSummary) -> PopulatedProfile {
        Profile {
            id: self.id,
            user: owner,
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            status: self.status,
            githubusername: self.githubusername,
            skills: self.skills,
            social: self.social,
            experience: self.experience,
            education: self.education,
            date: self.date,
        }
    }
}

impl<U> Profile<U> {
    /// Add an experience entry at the head of the list and return its new ID.
    pub fn add_experience(&mut self, new: NewExperience) -> EntryId {
        let entry = ExperienceEntry {
            id: EntryId::generate(),
            title: new.title,
            company: new.company,
            location: new.location,
            from: new.from,
            to: new.to,
            current: new.current,
            description: new.description,
        };
        insert_newest(&mut self.experience, entry)
    }

    /// Add an education entry at the head of the list and return its new ID.
    pub fn add_education(&mut self, new: NewEducation) -> EntryId {
        let entry = EducationEntry {
            id: EntryId::generate(),
            school: new.school,
            degree: new.degree,
            fieldofstudy: new.fieldofstudy,
            from: new.from,
            to: new.to,
            current: new.current,
            description: new.description,
        };
        insert_newest(&mut self.education, entry)
    }

    /// Remove the experience entry with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryNotFound`] if no entry has that ID; the list is unchanged.
    pub fn remove_experience(&mut self, id: EntryId) -> Result<ExperienceEntry, EntryNotFound> {
        remove_by_id(&mut self.experience, id)
    }

    /// Remove the education entry with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryNotFound`] if no entry has that ID; the list is unchanged.
    pub fn remove_education(&mut self, id: EntryId) -> Result<EducationEntry, EntryNotFound> {
        remove_by_id(&mut self.education, id)
    }
}
