//! Identifier and value types shared by every devhub crate.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::*;
