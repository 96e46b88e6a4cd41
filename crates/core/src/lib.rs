//! devhub core - domain types and pure profile logic.
//!
//! Shared by the HTTP server, the client and the CLI:
//! - `server` - axum JSON API for accounts and profiles
//! - `client` - HTTP client and profile action creator
//! - `cli` - migrations and account management
//!
//! # Architecture
//!
//! Only types and pure functions live here - no database access, no HTTP.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the normalized [`Email`]
//! - [`account`] - Account records and the public owner summary
//! - [`profile`] - Profile documents and the experience/education editor
//! - [`reconcile`] - Sparse profile updates from optional form fields
//! - [`validation`] - Field checks that collect every failure

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod profile;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use account::{Account, AccountSummary, NewAccount};
pub use profile::{
    EducationEntry, Entry, EntryKind, EntryNotFound, ExperienceEntry, NewEducation,
    NewExperience, PopulatedProfile, Profile, SocialLinks,
};
pub use reconcile::{ProfileInput, ProfileUpdate};
pub use types::*;
pub use validation::{FieldError, ValidationErrors, Validator};
