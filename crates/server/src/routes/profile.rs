//! Profile routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use devhub_core::reconcile::split_skills;
use devhub_core::{
    AccountId, EntryId, EntryKind, NewEducation, NewExperience, PopulatedProfile, Profile,
    ProfileInput, ProfileUpdate, ValidationErrors, Validator,
};

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::state::AppState;

const FROM_REQUIRED: &str = "From Date is required";
const FROM_INVALID: &str = "From date must be a valid date (YYYY-MM-DD)";
const TO_INVALID: &str = "To date must be a valid date (YYYY-MM-DD)";

/// Body of `PUT /api/profile/experience`.
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// Body of `PUT /api/profile/education`.
#[derive(Debug, Default, Deserialize)]
pub struct EducationInput {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// `{"msg": ...}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: &'static str,
}

fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unwrap a value that passed validation.
fn checked<T>(value: Option<T>, param: &str) -> Result<T> {
    value.ok_or_else(|| AppError::Internal(format!("{param} missing after validation")))
}

impl ExperienceInput {
    fn validate(self) -> Result<NewExperience> {
        let mut v = Validator::new();
        v.required("title", self.title.as_deref(), "Title is required")
            .required("company", self.company.as_deref(), "Company is required")
            .required("from", self.from.as_deref(), FROM_REQUIRED);
        let from = v.date("from", self.from.as_deref(), FROM_INVALID);
        let to = v.date("to", self.to.as_deref(), TO_INVALID);
        v.finish()?;

        Ok(NewExperience {
            title: checked(self.title, "title")?,
            company: checked(self.company, "company")?,
            location: text(self.location),
            from: checked(from, "from")?,
            to,
            current: self.current.unwrap_or(false),
            description: text(self.description),
        })
    }
}

impl EducationInput {
    fn validate(self) -> Result<NewEducation> {
        let mut v = Validator::new();
        v.required("school", self.school.as_deref(), "School is required")
            .required("degree", self.degree.as_deref(), "Degree is required")
            .required(
                "fieldofstudy",
                self.fieldofstudy.as_deref(),
                "Field Of Study is required",
            )
            .required("from", self.from.as_deref(), FROM_REQUIRED);
        let from = v.date("from", self.from.as_deref(), FROM_INVALID);
        let to = v.date("to", self.to.as_deref(), TO_INVALID);
        v.finish()?;

        Ok(NewEducation {
            school: checked(self.school, "school")?,
            degree: checked(self.degree, "degree")?,
            fieldofstudy: checked(self.fieldofstudy, "fieldofstudy")?,
            from: checked(from, "from")?,
            to,
            current: self.current.unwrap_or(false),
            description: text(self.description),
        })
    }
}

fn validate_profile(input: &ProfileInput) -> std::result::Result<(), ValidationErrors> {
    let has_skill = input
        .skills
        .as_deref()
        .is_some_and(|raw| !split_skills(raw).is_empty());

    let mut v = Validator::new();
    v.required("status", input.status.as_deref(), "Status is required")
        .check("skills", has_skill, "Skills is required");
    v.finish()
}

/// Malformed entry IDs cannot match any entry.
fn entry_id(raw: &str, kind: EntryKind) -> Result<EntryId> {
    raw.parse().map_err(|_| AppError::MalformedEntryId(kind))
}

/// `GET /api/profile/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<Json<PopulatedProfile>> {
    Ok(Json(state.profiles().my_profile(account).await?))
}

/// `POST /api/profile`
pub async fn upsert(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    JsonBody(input): JsonBody<ProfileInput>,
) -> Result<Json<Profile>> {
    validate_profile(&input)?;
    let update = ProfileUpdate::from_input(&input);
    Ok(Json(state.profiles().upsert(account, &update).await?))
}

/// `GET /api/profile`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PopulatedProfile>>> {
    Ok(Json(state.profiles().list().await?))
}

/// `GET /api/profile/user/{user_id}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PopulatedProfile>> {
    let user: AccountId = user_id
        .parse()
        .map_err(|_| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(state.profiles().by_user(user).await?))
}

/// `DELETE /api/profile`
pub async fn delete_account(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<Json<Message>> {
    state.profiles().delete_account(account).await?;
    Ok(Json(Message {
        msg: "User deleted",
    }))
}

/// `PUT /api/profile/experience`
pub async fn add_experience(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    JsonBody(input): JsonBody<ExperienceInput>,
) -> Result<Json<Profile>> {
    let entry = input.validate()?;
    Ok(Json(state.profiles().add_experience(account, entry).await?))
}

/// `DELETE /api/profile/experience/{exp_id}`
pub async fn remove_experience(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>> {
    let id = entry_id(&exp_id, EntryKind::Experience)?;
    Ok(Json(state.profiles().remove_experience(account, id).await?))
}

/// `PUT /api/profile/education`
pub async fn add_education(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    JsonBody(input): JsonBody<EducationInput>,
) -> Result<Json<Profile>> {
    let entry = input.validate()?;
    Ok(Json(state.profiles().add_education(account, entry).await?))
}

/// `DELETE /api/profile/education/{edu_id}`
pub async fn remove_education(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>> {
    let id = entry_id(&edu_id, EntryKind::Education)?;
    Ok(Json(state.profiles().remove_education(account, id).await?))
}

/// `GET /api/profile/github/{username}`
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>> {
    Ok(Json(state.github().latest_repos(&username).await?))
}
