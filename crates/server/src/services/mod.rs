//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password registration, login and signed tokens
//! - `profile` - Profile reads, upserts and experience/education editing
//! - `github` - Latest public repositories for a GitHub username
//!
//! Services borrow the stores from [`AppState`](crate::state::AppState) for
//! the duration of one request.

pub mod auth;
pub mod github;
pub mod profile;
