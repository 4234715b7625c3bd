//! The authenticated client and its retry gate
//!
//! `Client::send` wraps a single logical request: authorize, dispatch,
//! and — on a first-attempt 401 — refresh and replay once. Every other
//! outcome passes through unchanged, including non-auth error statuses and
//! network failures. Credential mutation happens only inside the
//! coordinator; this module never writes the store.

use std::sync::Arc;

use courier_auth::CredentialStore;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::error::{Error, Result};
use crate::intercept;
use crate::metrics;
use crate::transport::{HttpTransport, Request, Response, Transport};

/// One outbound request plus its retry marker.
///
/// The marker guarantees a request is replayed at most once after a refresh,
/// whatever the backend does — a second 401 is terminal, never another
/// refresh.
struct RequestAttempt {
    request: Request,
    retried: bool,
    /// Token handed back by the coordinator for the replay. Used instead of
    /// re-reading the store so the replay carries exactly the token this
    /// episode produced.
    fresh_token: Option<String>,
}

impl RequestAttempt {
    fn new(request: Request) -> Self {
        Self {
            request,
            retried: false,
            fresh_token: None,
        }
    }
}

/// Authenticated API client.
///
/// Cheap to share behind an `Arc`; all internal state is synchronized. Each
/// client owns its refresh coordinator, so independent clients never share a
/// refresh episode.
pub struct Client {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
}

impl Client {
    /// Build a client over a reqwest transport from configuration.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config));
        Ok(Self::with_transport(config, store, transport))
    }

    /// Build a client over a caller-provided transport (tests, custom stacks).
    pub fn with_transport(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            transport.clone(),
            config.refresh_path.clone(),
            config.platform.clone(),
        );
        Self {
            transport,
            store,
            coordinator,
        }
    }

    /// Issue a request, refreshing and replaying once on authentication failure.
    ///
    /// Responses with any status other than 401 are returned as-is — error
    /// statuses are the caller's to interpret. Network errors pass through
    /// without touching the token lifecycle.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let mut attempt = RequestAttempt::new(request);

        loop {
            let outbound = match attempt.fresh_token.as_deref() {
                Some(token) => intercept::with_bearer(attempt.request.clone(), token),
                None => {
                    let credential = self.store.load().await?;
                    intercept::authorize(attempt.request.clone(), credential.as_ref())
                }
            };

            let response = self.transport.send(outbound).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if attempt.retried {
                warn!(
                    method = %attempt.request.method,
                    path = %attempt.request.path,
                    "authentication failed again after refresh"
                );
                return Err(Error::RetryExhausted);
            }

            debug!(
                method = %attempt.request.method,
                path = %attempt.request.path,
                "authentication expired, requesting token refresh"
            );
            attempt.retried = true;
            // RefreshFailed from the coordinator replaces the 401: it is the
            // reason no replay was possible.
            let token = self.coordinator.refresh().await?;
            metrics::record_retry();
            attempt.fresh_token = Some(token);
        }
    }

    /// Reject any requests queued on an in-flight refresh and release them
    /// with `Error::Closed`. Call when tearing the client down.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown().await;
    }
}
