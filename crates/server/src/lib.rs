//! devhub server library.
//!
//! JSON API for developer accounts and profiles. Exposed as a library so the
//! CLI can reuse the stores and the authentication service, and so the
//! router can be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
