//! Bearer-token request authorization
//!
//! Pure transformations: attach the stored access token to an outbound
//! request, or a specific token after a refresh. No side effects, no I/O.

use courier_auth::Credential;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::warn;

use crate::transport::Request;

/// Attach `Authorization: Bearer <access_token>` from the credential, if any.
///
/// With no credential the request goes out unauthenticated — the backend
/// decides whether the route requires auth.
pub fn authorize(request: Request, credential: Option<&Credential>) -> Request {
    match credential {
        Some(cred) => with_bearer(request, &cred.access_token),
        None => request,
    }
}

/// Attach `Authorization: Bearer <token>`, replacing any existing value.
pub fn with_bearer(mut request: Request, token: &str) -> Request {
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }
        Err(e) => {
            // Token with non-header-safe bytes; send unauthenticated and let
            // the backend reject it rather than failing the dispatch.
            warn!(error = %e, "access token is not a valid header value, skipping");
        }
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_attaches_bearer_from_credential() {
        let cred = Credential::new("at_123", "rt_456");
        let request = authorize(Request::get("/api/v1/orders"), Some(&cred));
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Bearer at_123"
        );
    }

    #[test]
    fn authorize_without_credential_leaves_request_bare() {
        let request = authorize(Request::get("/api/v1/orders"), None);
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn with_bearer_replaces_existing_header() {
        let request = with_bearer(Request::get("/api/v1/orders"), "at_old");
        let request = with_bearer(request, "at_new");
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Bearer at_new"
        );
    }

    #[test]
    fn bearer_header_is_marked_sensitive() {
        let request = with_bearer(Request::get("/api/v1/orders"), "at_123");
        assert!(request.headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn invalid_token_bytes_skip_authorization() {
        let request = with_bearer(Request::get("/api/v1/orders"), "at_\nnewline");
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }
}
