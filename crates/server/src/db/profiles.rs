//! `PostgreSQL` profile store.
//!
//! Profiles are stored one row per account. Scalar fields are columns, the
//! social links and both entry lists are JSONB so that a loaded document can
//! be edited in memory and written back whole.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use devhub_core::{
    AccountId, EducationEntry, ExperienceEntry, Profile, ProfileId, ProfileUpdate, SocialLinks,
};

use super::{ProfileStore, RepositoryError};

const PROFILE_COLUMNS: &str = "id, user_id, company, website, location, bio, status, \
     githubusername, skills, social, experience, education, created_at";

#[derive(FromRow)]
struct ProfileRow {
    id: ProfileId,
    user_id: AccountId,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: Option<String>,
    githubusername: Option<String>,
    skills: Vec<String>,
    social: Json<SocialLinks>,
    experience: Json<Vec<ExperienceEntry>>,
    education: Json<Vec<EducationEntry>>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            company: row.company,
            website: row.website,
            location: row.location,
            bio: row.bio,
            status: row.status,
            githubusername: row.githubusername,
            skills: row.skills,
            social: row.social.0,
            experience: row.experience.0,
            education: row.education.0,
            date: row.created_at,
        }
    }
}

/// Profile store backed by the `devhub.profile` table.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a new profile store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    #[instrument(skip(self))]
    async fn find_by_account(&self, user: AccountId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM devhub.profile WHERE user_id = $1"
        ))
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM devhub.profile ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    #[instrument(skip(self, update), fields(fields = ?update.field_names()))]
    async fn upsert(
        &self,
        user: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        // Absent fields bind as NULL and COALESCE keeps the stored value;
        // `social || $9` merges only the links that were supplied.
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r"
            INSERT INTO devhub.profile AS p
                (user_id, company, website, location, bio, status, githubusername, skills, social)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                    COALESCE($8, '{{}}'::text[]), COALESCE($9, '{{}}'::jsonb))
            ON CONFLICT (user_id) DO UPDATE SET
                company = COALESCE($2, p.company),
                website = COALESCE($3, p.website),
                location = COALESCE($4, p.location),
                bio = COALESCE($5, p.bio),
                status = COALESCE($6, p.status),
                githubusername = COALESCE($7, p.githubusername),
                skills = COALESCE($8, p.skills),
                social = p.social || COALESCE($9, '{{}}'::jsonb)
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(user)
        .bind(update.company.as_deref())
        .bind(update.website.as_deref())
        .bind(update.location.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.status.as_deref())
        .bind(update.githubusername.as_deref())
        .bind(update.skills.as_deref())
        .bind(update.social.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    async fn save(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r"
            UPDATE devhub.profile SET
                company = $2,
                website = $3,
                location = $4,
                bio = $5,
                status = $6,
                githubusername = $7,
                skills = $8,
                social = $9,
                experience = $10,
                education = $11
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(profile.id)
        .bind(profile.company.as_deref())
        .bind(profile.website.as_deref())
        .bind(profile.location.as_deref())
        .bind(profile.bio.as_deref())
        .bind(profile.status.as_deref())
        .bind(profile.githubusername.as_deref())
        .bind(&profile.skills)
        .bind(Json(&profile.social))
        .bind(Json(&profile.experience))
        .bind(Json(&profile.education))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::from).ok_or(RepositoryError::NotFound)
    }

}
