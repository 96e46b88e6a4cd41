//! Request field validation.
//!
//! Handlers describe the checks a request body must pass and collect every
//! failure in one go, so the client gets the complete list of problems back
//! in a single 400 response:
//!
//! ```
//! use devhub_core::validation::Validator;
//!
//! let mut v = Validator::new();
//! v.required("name", Some(""), "Name is required");
//! v.min_len("password", Some("12345"), 8, "Please enter a password of 8 or more characters");
//!
//! let errors = v.finish().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::Email;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
    /// Always `"body"`: only request bodies are validated field by field.
    pub location: &'static str,
}

/// All failed checks for a request, in the order they were run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Number of failed checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when every check passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Accumulates field checks for one request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, param: &str, msg: &str) {
        self.errors.push(FieldError {
            msg: msg.to_owned(),
            param: param.to_owned(),
            location: "body",
        });
    }

    /// Record a failure for `param` unless `passed`.
    pub fn check(&mut self, param: &str, passed: bool, msg: &str) -> &mut Self {
        if !passed {
            self.reject(param, msg);
        }
        self
    }

    /// The field must be present and not blank.
    pub fn required(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if is_blank(value) {
            self.reject(param, msg);
        }
        self
    }

    /// The field must be present (an empty string is accepted).
    pub fn exists(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if value.is_none() {
            self.reject(param, msg);
        }
        self
    }

    /// The field must parse as an [`Email`].
    pub fn email(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if value.is_none_or(|v| Email::parse(v).is_err()) {
            self.reject(param, msg);
        }
        self
    }

    /// The field must be present and at least `min` characters long.
    pub fn min_len(&mut self, param: &str, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        if value.is_none_or(|v| v.chars().count() < min) {
            self.reject(param, msg);
        }
        self
    }

    /// Parse an optional `YYYY-MM-DD` date or RFC 3339 timestamp, rejecting
    /// anything else. Timestamps keep only their calendar date.
    ///
    /// A missing or blank value yields `None` without an error; pair with
    /// [`Validator::required`] when the date is mandatory.
    pub fn date(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<NaiveDate> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()));
        if parsed.is_none() {
            self.reject(param, msg);
        }
        parsed
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns every recorded [`FieldError`] if any check failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn failed(errors: &ValidationErrors, param: &str) -> bool {
        errors.errors.iter().any(|e| e.param == param)
    }

    #[test]
    fn test_all_checks_pass() {
        let mut v = Validator::new();
        v.required("name", Some("Ada"), "Name is required")
            .email("email", Some("ada@example.com"), "Please use a valid email")
            .min_len("password", Some("correct horse"), 8, "too short");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_required_rejects_missing_and_blank() {
        let mut v = Validator::new();
        v.required("title", None, "Title is required")
            .required("company", Some("  "), "Company is required");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors[0].param, "title");
        assert_eq!(errors.errors[1].msg, "Company is required");
    }

    #[test]
    fn test_exists_accepts_empty_string() {
        let mut v = Validator::new();
        v.exists("password", Some(""), "Password is required");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.exists("password", None, "Password is required");
        assert!(failed(&v.finish().unwrap_err(), "password"));
    }

    #[test]
    fn test_min_len_counts_characters() {
        let mut v = Validator::new();
        v.min_len("password", Some("12345"), 8, "Please enter a password of 8 or more characters");
        let errors = v.finish().unwrap_err();
        assert!(errors.errors[0].msg.contains("8 or more characters"));

        let mut v = Validator::new();
        v.min_len("password", Some("pässwörd"), 8, "short");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_email_check() {
        let mut v = Validator::new();
        v.email("email", Some("not-an-email"), "Please use a valid email");
        assert!(failed(&v.finish().unwrap_err(), "email"));
    }

    #[test]
    fn test_date_parsing() {
        let mut v = Validator::new();
        assert_eq!(
            v.date("from", Some("2019-03-01"), "bad"),
            NaiveDate::from_ymd_opt(2019, 3, 1)
        );
        assert_eq!(
            v.date("to", Some("2021-07-15T00:00:00.000Z"), "bad"),
            NaiveDate::from_ymd_opt(2021, 7, 15)
        );
        assert_eq!(v.date("to", None, "bad"), None);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_date_rejects_garbage() {
        let mut v = Validator::new();
        assert_eq!(v.date("from", Some("last spring"), "From date must be a valid date"), None);
        let errors = v.finish().unwrap_err();
        assert!(failed(&errors, "from"));
    }

    #[test]
    fn test_date_rejects_trailing_text() {
        let mut v = Validator::new();
        assert_eq!(v.date("from", Some("2020-01-01garbage"), "bad"), None);
        assert_eq!(v.date("to", Some("2020-01-01T99"), "bad"), None);
        let errors = v.finish().unwrap_err();
        assert!(failed(&errors, "from"));
        assert!(failed(&errors, "to"));
    }

    #[test]
    fn test_check() {
        let mut v = Validator::new();
        v.check("skills", true, "Skills is required")
            .check("current", false, "Invalid value");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].param, "current");
    }

    #[test]
    fn test_serialized_shape() {
        let mut v = Validator::new();
        v.required("status", None, "Status is required");
        let json = serde_json::to_value(v.finish().unwrap_err()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "errors": [{"msg": "Status is required", "param": "status", "location": "body"}]
            })
        );
    }
}
