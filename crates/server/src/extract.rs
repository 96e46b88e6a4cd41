//! JSON body extractor that reports problems as field validation errors.
//!
//! Axum's `Json` rejects a body whose fields have the wrong JSON type with a
//! plain-text 422. [`JsonBody`] answers with the usual 400
//! `{"errors":[{msg,param,location}]}` list instead, naming each offending
//! field.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use devhub_core::{FieldError, ValidationErrors, Validator};

use crate::error::AppError;

/// Message for a field whose value has the wrong type.
pub const INVALID_VALUE: &str = "Invalid value";

/// Message for a body that is not a JSON object.
pub const INVALID_BODY: &str = "Request body must be a JSON object";

/// A request body deserialized into `T`.
///
/// `T` is expected to be a flat struct of optional fields, so each field can
/// be checked on its own.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

fn body_error() -> ValidationErrors {
    ValidationErrors {
        errors: vec![FieldError {
            msg: INVALID_BODY.to_string(),
            param: "body".to_string(),
            location: "body",
        }],
    }
}

/// Name every top-level field that `T` cannot accept.
fn invalid_fields<T: DeserializeOwned>(value: &Value) -> ValidationErrors {
    let Value::Object(fields) = value else {
        return body_error();
    };

    let mut v = Validator::new();
    for (name, field) in fields {
        let mut single = Map::new();
        single.insert(name.clone(), field.clone());
        v.check(name, T::deserialize(&Value::Object(single)).is_ok(), INVALID_VALUE);
    }
    v.finish().err().unwrap_or_else(body_error)
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                AppError::Validation(body_error())
            })?;

        match T::deserialize(&value) {
            Ok(body) => Ok(Self(body)),
            Err(e) => {
                tracing::debug!(error = %e, "Request body has mistyped fields");
                Err(AppError::Validation(invalid_fields::<T>(&value)))
            }
        }
    }
}
