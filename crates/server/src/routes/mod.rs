//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Accounts
//! POST   /api/users                      - Register, returns {token}
//!
//! # Auth
//! GET    /api/auth                       - Current account (token)
//! POST   /api/auth                       - Login, returns {token}
//!
//! # Profiles
//! GET    /api/profile/me                 - Own profile (token)
//! POST   /api/profile                    - Create or update own profile (token)
//! GET    /api/profile                    - All profiles
//! DELETE /api/profile                    - Delete own profile and account (token)
//! GET    /api/profile/user/{user_id}     - Profile by account ID
//! PUT    /api/profile/experience         - Add experience entry (token)
//! DELETE /api/profile/experience/{id}    - Remove experience entry (token)
//! PUT    /api/profile/education          - Add education entry (token)
//! DELETE /api/profile/education/{id}     - Remove education entry (token)
//! GET    /api/profile/github/{username}  - Latest GitHub repositories
//! ```

pub mod auth;
pub mod profile;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Registration and login routes. The binary puts these behind the auth
/// rate limiter.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/auth", get(auth::current_account).post(auth::login))
}

/// Profile routes.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profile",
            get(profile::list)
                .post(profile::upsert)
                .delete(profile::delete_account),
        )
        .route("/api/profile/me", get(profile::me))
        .route("/api/profile/user/{user_id}", get(profile::by_user))
        .route("/api/profile/experience", put(profile::add_experience))
        .route(
            "/api/profile/experience/{exp_id}",
            delete(profile::remove_experience),
        )
        .route("/api/profile/education", put(profile::add_education))
        .route(
            "/api/profile/education/{edu_id}",
            delete(profile::remove_education),
        )
        .route("/api/profile/github/{username}", get(profile::github_repos))
}

/// Every API route, without rate limiting.
pub fn routes() -> Router<AppState> {
    credential_routes().merge(profile_routes())
}
