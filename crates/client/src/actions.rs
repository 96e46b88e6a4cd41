//! Profile actions delivered to a client-side store.

use serde::Serialize;

/// Outcome of a profile request, shaped for a client-side reducer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileAction {
    /// The current user's profile, as returned by the API.
    GetProfile(serde_json::Value),

    /// The request failed.
    ///
    /// `msg` is the canonical reason phrase of the HTTP status, or the
    /// transport error when no response arrived (then `status` is `None`).
    ProfileError { msg: String, status: Option<u16> },
}

/// Receiver of profile actions.
pub trait Dispatch {
    fn dispatch(&mut self, action: ProfileAction);
}

impl Dispatch for Vec<ProfileAction> {
    fn dispatch(&mut self, action: ProfileAction) {
        self.push(action);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_action_wire_shape() {
        let ok = ProfileAction::GetProfile(json!({ "status": "Developer" }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "type": "GET_PROFILE", "payload": { "status": "Developer" } })
        );

        let err = ProfileAction::ProfileError {
            msg: "Bad Request".to_string(),
            status: Some(400),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "type": "PROFILE_ERROR", "payload": { "msg": "Bad Request", "status": 400 } })
        );
    }

    #[test]
    fn test_vec_collects_in_order() {
        let mut actions: Vec<ProfileAction> = Vec::new();
        actions.dispatch(ProfileAction::GetProfile(json!(1)));
        actions.dispatch(ProfileAction::GetProfile(json!(2)));
        assert_eq!(
            actions,
            [
                ProfileAction::GetProfile(json!(1)),
                ProfileAction::GetProfile(json!(2))
            ]
        );
    }
}
