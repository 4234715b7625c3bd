//! The persisted sign-in credential
//!
//! A single record holding the bearer access token, the longer-lived refresh
//! token, and the signed-in user's id when the backend provided one. Field
//! names serialize as camelCase to match the persisted JSON format the
//! backend and mobile clients share.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OAuth-style token pair for one signed-in user.
///
/// Replaced wholesale on every refresh — the store interface takes the whole
/// record, so a reader can never observe a new access token next to a stale
/// refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Short-lived bearer token attached to each authenticated request
    pub access_token: String,
    /// Longer-lived token exchanged for a new access token on 401
    pub refresh_token: String,
    /// Backend user id, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Credential {
    /// Build a credential from a fresh token pair, carrying no user id.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user_id: None,
        }
    }

    /// Attach a user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

// Tokens must never reach logs. Debug shows only the user id.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let cred = Credential::new("at_abc", "rt_def").with_user_id("user-42");
        let json = serde_json::to_string(&cred).unwrap();
        assert!(json.contains("\"accessToken\":\"at_abc\""));
        assert!(json.contains("\"refreshToken\":\"rt_def\""));
        assert!(json.contains("\"userId\":\"user-42\""));
    }

    #[test]
    fn deserializes_without_user_id() {
        let json = r#"{"accessToken":"at_1","refreshToken":"rt_1"}"#;
        let cred: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.access_token, "at_1");
        assert_eq!(cred.refresh_token, "rt_1");
        assert_eq!(cred.user_id, None);
    }

    #[test]
    fn user_id_omitted_when_absent() {
        let json = serde_json::to_string(&Credential::new("at", "rt")).unwrap();
        assert!(!json.contains("userId"));
    }

    #[test]
    fn debug_redacts_tokens() {
        let cred = Credential::new("at_secret", "rt_secret").with_user_id("user-1");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("at_secret"));
        assert!(!debug.contains("rt_secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("user-1"));
    }
}
