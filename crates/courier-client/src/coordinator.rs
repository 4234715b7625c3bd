//! Single-flight token refresh coordination
//!
//! At most one refresh exchange is in flight per coordinator at any time.
//! The first caller to hit an expired token starts the exchange; callers
//! arriving while it runs are queued and released with its outcome, in
//! arrival order. Starting or enqueueing is decided under one lock, so two
//! concurrent failures can never both issue an exchange — the second
//! exchange could invalidate the refresh token the first one just rotated.
//!
//! The exchange itself runs on a detached task, and every caller — the one
//! that started it included — awaits the outcome through its own channel.
//! Dropping a caller's future mid-refresh (a `tokio::time::timeout` around
//! `Client::send`, an aborted task) therefore cannot strand the episode:
//! the exchange completes on its own and resolves whoever is still waiting.
//!
//! Single-flight holds per coordinator instance only. Two processes sharing
//! one persisted refresh token can still race each other against a backend
//! that rotates tokens on use; that coordination is out of scope here.
//!
//! On success the credential store is replaced with the new token pair and
//! every caller receives the new access token. On failure (non-2xx, network
//! error, timeout, missing refresh token) the store is cleared — the user is
//! effectively signed out — and every caller receives the same
//! `RefreshFailed`.

use std::mem;
use std::sync::Arc;

use courier_auth::{Credential, CredentialStore, RefreshRequest, RefreshResponse};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::metrics;
use crate::transport::{Request, Transport};

/// Outcome delivered to every caller of one refresh episode: the new access
/// token, or the error that ended the episode.
type Outcome = Result<String>;

enum RefreshState {
    Idle,
    Refreshing {
        /// Callers awaiting the in-flight exchange, in arrival order. The
        /// caller that started the episode is first.
        waiters: Vec<oneshot::Sender<Outcome>>,
    },
}

/// Serializes refresh exchanges for one client instance.
///
/// Owned by the `Client`, never process-global: independent clients (and
/// tests) each coordinate their own refreshes.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<RefreshState>,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    refresh_path: String,
    platform: String,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        refresh_path: String,
        platform: String,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RefreshState::Idle),
                store,
                transport,
                refresh_path,
                platform,
            }),
        }
    }

    /// Obtain a fresh access token, joining an in-flight exchange if one exists.
    ///
    /// The caller suspends until the episode resolves. Exactly one exchange is
    /// issued per episode regardless of how many callers arrive while it runs.
    /// Dropping this future leaves the episode running; remaining callers
    /// still resolve.
    pub async fn refresh(&self) -> Result<String> {
        let rx = {
            let mut state = self.inner.state.lock().await;
            let (tx, rx) = oneshot::channel();
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    waiters.push(tx);
                    debug!(queued = waiters.len(), "refresh in flight, queueing request");
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing { waiters: vec![tx] };
                    // Detached so caller cancellation cannot strand the
                    // episode; the task resolves every queued waiter.
                    let inner = self.inner.clone();
                    tokio::spawn(async move { inner.run_exchange().await });
                }
            }
            rx
        };

        match rx.await {
            Ok(outcome) => outcome,
            // Sender dropped without resolving: the coordinator is gone
            Err(_) => Err(Error::Closed),
        }
    }

    /// Reject all queued waiters and reset to idle.
    ///
    /// Called on client teardown. An exchange still outstanding completes on
    /// its detached task and finds no waiters to notify.
    pub async fn shutdown(&self) {
        let waiters = {
            let mut state = self.inner.state.lock().await;
            match mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        if !waiters.is_empty() {
            warn!(waiters = waiters.len(), "rejecting queued requests on shutdown");
        }
        for tx in waiters {
            let _ = tx.send(Err(Error::Closed));
        }
    }
}

impl Inner {
    /// Run one exchange to completion, then release every queued waiter with
    /// the outcome, FIFO.
    async fn run_exchange(&self) {
        let outcome = self.exchange().await;

        match &outcome {
            Ok(_) => {
                metrics::record_refresh("success");
                info!(platform = %self.platform, "token refresh succeeded");
            }
            Err(e) => {
                metrics::record_refresh("failure");
                warn!(error = %e, "token refresh failed");
            }
        }

        let waiters = {
            let mut state = self.state.lock().await;
            match mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                // Shutdown already drained the queue
                RefreshState::Idle => Vec::new(),
            }
        };
        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), "releasing queued requests");
        }
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }
    }

    /// Perform one refresh exchange against the backend.
    ///
    /// Any exchange failure clears the credential store: the refresh token is
    /// spent or rejected and keeping a half-valid credential around would
    /// leave every subsequent request looping through 401s.
    async fn exchange(&self) -> Result<String> {
        let Some(credential) = self.store.load().await? else {
            self.clear_store().await;
            return Err(Error::RefreshFailed("no refresh token stored".into()));
        };

        let body = RefreshRequest {
            refresh_token: credential.refresh_token.clone(),
            platform: self.platform.clone(),
        };
        let request = Request::post(&self.refresh_path)
            .json(&body)
            .map_err(|e| Error::RefreshFailed(format!("encoding refresh request: {e}")))?;

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.clear_store().await;
                return Err(Error::RefreshFailed(format!("refresh exchange failed: {e}")));
            }
        };

        if !response.status.is_success() {
            self.clear_store().await;
            return Err(Error::RefreshFailed(format!(
                "refresh endpoint returned {}: {}",
                response.status,
                response.body_text()
            )));
        }

        let parsed: RefreshResponse = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                self.clear_store().await;
                return Err(Error::RefreshFailed(format!("invalid refresh response: {e}")));
            }
        };

        // The backend may rotate the refresh token; keep the old one when the
        // response omits it. The user id is not part of the exchange.
        let updated = Credential {
            access_token: parsed.token.clone(),
            refresh_token: parsed
                .refresh_token
                .unwrap_or(credential.refresh_token),
            user_id: credential.user_id,
        };
        self.store.save(updated).await?;

        Ok(parsed.token)
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credential after refresh failure");
        }
    }
}
