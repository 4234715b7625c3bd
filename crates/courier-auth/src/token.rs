//! Wire types for the refresh exchange endpoint
//!
//! The exchange is a single POST: the stored refresh token and the client
//! platform go out, a new access token (and usually a rotated refresh token)
//! comes back. The client crate drives the HTTP call; this module only pins
//! down the JSON shapes.

use serde::{Deserialize, Serialize};

/// Body sent to the refresh exchange endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
    /// Originating client platform ("web", "ios", "android")
    pub platform: String,
}

/// Successful response from the refresh exchange endpoint.
///
/// `refresh_token` is optional: some backend versions rotate the refresh
/// token on every exchange, others return only a new access token. When it
/// is absent the caller keeps the refresh token it already holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let req = RefreshRequest {
            refresh_token: "rt_abc".into(),
            platform: "web".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"refreshToken\":\"rt_abc\""));
        assert!(json.contains("\"platform\":\"web\""));
    }

    #[test]
    fn response_with_rotated_refresh_token() {
        let json = r#"{"token":"at_new","refreshToken":"rt_new"}"#;
        let resp: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "at_new");
        assert_eq!(resp.refresh_token.as_deref(), Some("rt_new"));
    }

    #[test]
    fn response_without_refresh_token() {
        let json = r#"{"token":"at_new"}"#;
        let resp: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "at_new");
        assert_eq!(resp.refresh_token, None);
    }
}
