//! Client error taxonomy
//!
//! Only a first-attempt 401 is recovered internally (refresh and retry);
//! every variant here is terminal for the caller. `Clone` is required so the
//! refresh coordinator can broadcast one failure to every queued waiter.

use crate::transport::TransportError;

/// Terminal errors surfaced by `Client::send`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Transport-level timeout, passed through unchanged. Never triggers refresh.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure unrelated to authentication, passed through
    /// unchanged. Never triggers refresh.
    #[error("network error: {0}")]
    Network(String),

    /// The refresh exchange itself failed. The credential store has been
    /// cleared; the application should treat this as signed out.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// A request failed authentication again after a successful
    /// refresh-and-retry cycle. No further refresh is attempted.
    #[error("authentication failed after token refresh")]
    RetryExhausted,

    /// The client was shut down while this request waited on a refresh.
    #[error("client closed while awaiting token refresh")]
    Closed,

    /// Credential persistence failed.
    #[error("credential storage error: {0}")]
    Store(String),

    /// Invalid or unreadable client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => Error::Timeout(msg),
            TransportError::Network(msg) => Error::Network(msg),
        }
    }
}

impl From<courier_auth::Error> for Error {
    fn from(err: courier_auth::Error) -> Self {
        Error::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_to_matching_variants() {
        let err: Error = TransportError::Timeout("after 30s".into()).into();
        assert!(matches!(err, Error::Timeout(_)), "got: {err:?}");

        let err: Error = TransportError::Network("connection refused".into()).into();
        assert!(matches!(err, Error::Network(_)), "got: {err:?}");
    }

    #[test]
    fn store_errors_map_to_store_variant() {
        let err: Error = courier_auth::Error::Io("disk full".into()).into();
        assert!(matches!(err, Error::Store(_)), "got: {err:?}");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn error_display_is_descriptive() {
        assert_eq!(
            Error::RetryExhausted.to_string(),
            "authentication failed after token refresh"
        );
        assert!(
            Error::RefreshFailed("endpoint returned 400".into())
                .to_string()
                .contains("endpoint returned 400")
        );
        assert_eq!(
            Error::Closed.to_string(),
            "client closed while awaiting token refresh"
        );
    }

    #[test]
    fn errors_are_cloneable_for_broadcast() {
        let err = Error::RefreshFailed("bad refresh token".into());
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }
}
