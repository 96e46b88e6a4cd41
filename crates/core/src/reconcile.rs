//! Profile field reconciliation.
//!
//! Turns a sparse profile submission into a [`ProfileUpdate`] that contains
//! only the fields the client actually supplied. Missing and blank values are
//! left out entirely (never stored as `null`), so merging the update into an
//! existing profile keeps whatever was stored before for those fields.
//!
//! The text fields are described by two tables, one for top-level profile
//! fields and one for the links nested under `social`. Adding a field means
//! adding a row; the omit-if-absent rule lives in [`present`] alone.

use serde::{Deserialize, Serialize};

use crate::profile::{Profile, SocialLinks};

/// Profile fields as submitted by the client. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    /// Comma-separated list, e.g. `"rust, go ,sql"`.
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// The supplied subset of a profile, ready to merge or insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<SocialLinks>,
}

/// One row of a field table: where to read the value and where to put it.
struct FieldMapping<T> {
    name: &'static str,
    get: fn(&ProfileInput) -> Option<&str>,
    set: fn(&mut T, String),
}

const PROFILE_FIELDS: &[FieldMapping<ProfileUpdate>] = &[
    FieldMapping {
        name: "company",
        get: |input| input.company.as_deref(),
        set: |update, value| update.company = Some(value),
    },
    FieldMapping {
        name: "website",
        get: |input| input.website.as_deref(),
        set: |update, value| update.website = Some(value),
    },
    FieldMapping {
        name: "location",
        get: |input| input.location.as_deref(),
        set: |update, value| update.location = Some(value),
    },
    FieldMapping {
        name: "bio",
        get: |input| input.bio.as_deref(),
        set: |update, value| update.bio = Some(value),
    },
    FieldMapping {
        name: "status",
        get: |input| input.status.as_deref(),
        set: |update, value| update.status = Some(value),
    },
    FieldMapping {
        name: "githubusername",
        get: |input| input.githubusername.as_deref(),
        set: |update, value| update.githubusername = Some(value),
    },
];

const SOCIAL_FIELDS: &[FieldMapping<SocialLinks>] = &[
    FieldMapping {
        name: "youtube",
        get: |input| input.youtube.as_deref(),
        set: |social, value| social.youtube = Some(value),
    },
    FieldMapping {
        name: "twitter",
        get: |input| input.twitter.as_deref(),
        set: |social, value| social.twitter = Some(value),
    },
    FieldMapping {
        name: "facebook",
        get: |input| input.facebook.as_deref(),
        set: |social, value| social.facebook = Some(value),
    },
    FieldMapping {
        name: "linkedin",
        get: |input| input.linkedin.as_deref(),
        set: |social, value| social.linkedin = Some(value),
    },
    FieldMapping {
        name: "instagram",
        get: |input| input.instagram.as_deref(),
        set: |social, value| social.instagram = Some(value),
    },
];

/// A submitted value counts only if it has non-whitespace content.
fn present(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
}

/// Copy every present field of `input` described by `table` into `target`.
/// Returns the names of the copied fields.
fn fill<T>(table: &[FieldMapping<T>], input: &ProfileInput, target: &mut T) -> Vec<&'static str> {
    let mut copied = Vec::new();
    for field in table {
        if let Some(value) = present((field.get)(input)) {
            (field.set)(target, value);
            copied.push(field.name);
        }
    }
    copied
}

/// Split a comma-separated skills string into trimmed, non-empty tokens.
///
/// ```
/// use devhub_core::reconcile::split_skills;
///
/// assert_eq!(split_skills("a, b ,c"), ["a", "b", "c"]);
/// ```
#[must_use]
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_owned)
        .collect()
}

impl ProfileUpdate {
    /// Build the update from a client submission.
    #[must_use]
    pub fn from_input(input: &ProfileInput) -> Self {
        let mut update = Self::default();
        fill(PROFILE_FIELDS, input, &mut update);

        update.skills = present(input.skills.as_deref()).map(|raw| split_skills(&raw));

        let mut social = SocialLinks::default();
        if !fill(SOCIAL_FIELDS, input, &mut social).is_empty() {
            update.social = Some(social);
        }

        update
    }

    /// Names of the supplied keys, as they appear in the serialized update.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().map(|(key, _)| key).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` when nothing was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.website.is_none()
            && self.location.is_none()
            && self.bio.is_none()
            && self.status.is_none()
            && self.githubusername.is_none()
            && self.skills.is_none()
            && self.social.is_none()
    }

    /// Merge into an existing profile: supplied fields overwrite, the rest
    /// keep their stored values. Social links merge link by link.
    pub fn apply_to(&self, profile: &mut Profile) {
        macro_rules! overwrite {
            ($from:expr, $to:expr; $($field:ident),+) => {
                $(
                    if let Some(value) = &$from.$field {
                        $to.$field = Some(value.clone());
                    }
                )+
            };
        }

        overwrite!(self, profile; company, website, location, bio, status, githubusername);

        if let Some(skills) = &self.skills {
            profile.skills.clone_from(skills);
        }

        if let Some(social) = &self.social {
            overwrite!(social, profile.social; youtube, twitter, facebook, linkedin, instagram);
        }
    }

    /// Build a brand-new profile from this update; unsupplied fields take
    /// their empty defaults.
    #[must_use]
    pub fn into_profile(
        self,
        id: crate::ProfileId,
        user: crate::AccountId,
        date: chrono::DateTime<chrono::Utc>,
    ) -> Profile {
        let mut profile = Profile::empty(id, user, date);
        self.apply_to(&mut profile);
        profile
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{AccountId, ProfileId};

    fn keys(update: &ProfileUpdate) -> Vec<String> {
        let json = serde_json::to_value(update).unwrap();
        let mut keys: Vec<String> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_only_supplied_fields_are_emitted() {
        let input = ProfileInput {
            status: Some("Developer".to_string()),
            bio: Some("Writes Rust".to_string()),
            ..ProfileInput::default()
        };

        let update = ProfileUpdate::from_input(&input);
        assert_eq!(keys(&update), ["bio", "status"]);
        assert_eq!(update.field_names(), ["bio", "status"]);
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let input = ProfileInput {
            company: Some(String::new()),
            website: Some("   ".to_string()),
            skills: Some(" ".to_string()),
            twitter: Some(String::new()),
            ..ProfileInput::default()
        };

        let update = ProfileUpdate::from_input(&input);
        assert!(update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }

    #[test]
    fn test_no_explicit_nulls() {
        let input = ProfileInput {
            company: Some("Acme".to_string()),
            youtube: Some("https://youtube.com/acme".to_string()),
            ..ProfileInput::default()
        };

        let json = serde_json::to_string(&ProfileUpdate::from_input(&input)).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_split_skills_trims_tokens() {
        assert_eq!(split_skills("a, b ,c"), ["a", "b", "c"]);
        assert_eq!(split_skills("HTML,CSS,  JavaScript"), ["HTML", "CSS", "JavaScript"]);
    }

    #[test]
    fn test_split_skills_drops_empty_tokens() {
        assert_eq!(split_skills("rust,, ,go,"), ["rust", "go"]);
    }

    #[test]
    fn test_social_nested_and_sparse() {
        let input = ProfileInput {
            twitter: Some("https://twitter.com/ada".to_string()),
            linkedin: Some("https://linkedin.com/in/ada".to_string()),
            ..ProfileInput::default()
        };

        let update = ProfileUpdate::from_input(&input);
        assert_eq!(keys(&update), ["social"]);

        let json = serde_json::to_value(&update).unwrap();
        let social = json["social"].as_object().unwrap();
        let mut social_keys: Vec<&String> = social.keys().collect();
        social_keys.sort();
        assert_eq!(social_keys, ["linkedin", "twitter"]);
    }

    #[test]
    fn test_social_omitted_when_no_links() {
        let input = ProfileInput {
            status: Some("Student".to_string()),
            ..ProfileInput::default()
        };
        assert!(ProfileUpdate::from_input(&input).social.is_none());
    }

    #[test]
    fn test_apply_keeps_unsupplied_values() {
        let mut profile = Profile::empty(ProfileId::new(1), AccountId::new(1), Utc::now());
        profile.company = Some("Old Co".to_string());
        profile.status = Some("Junior".to_string());
        profile.social.youtube = Some("yt".to_string());

        let update = ProfileUpdate::from_input(&ProfileInput {
            status: Some("Senior".to_string()),
            twitter: Some("tw".to_string()),
            ..ProfileInput::default()
        });
        update.apply_to(&mut profile);

        assert_eq!(profile.company.as_deref(), Some("Old Co"));
        assert_eq!(profile.status.as_deref(), Some("Senior"));
        assert_eq!(profile.social.youtube.as_deref(), Some("yt"));
        assert_eq!(profile.social.twitter.as_deref(), Some("tw"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let update = ProfileUpdate::from_input(&ProfileInput {
            company: Some("Acme".to_string()),
            status: Some("Developer".to_string()),
            skills: Some("rust, sql".to_string()),
            facebook: Some("fb".to_string()),
            ..ProfileInput::default()
        });

        let mut once = Profile::empty(ProfileId::new(1), AccountId::new(1), Utc::now());
        update.apply_to(&mut once);
        let mut twice = once.clone();
        update.apply_to(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_into_profile_defaults() {
        let update = ProfileUpdate::from_input(&ProfileInput {
            status: Some("Developer".to_string()),
            skills: Some("rust".to_string()),
            ..ProfileInput::default()
        });

        let profile = update.into_profile(ProfileId::new(9), AccountId::new(3), Utc::now());
        assert_eq!(profile.user, AccountId::new(3));
        assert_eq!(profile.skills, ["rust"]);
        assert!(profile.company.is_none());
        assert!(profile.social.is_empty());
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
    }
}
