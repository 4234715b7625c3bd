//! Authenticated API client for the Courier backend
//!
//! Wraps a plain HTTP transport with the token lifecycle the backend expects:
//! every outbound request carries the stored bearer token, a 401 triggers one
//! refresh exchange shared by all concurrently failing requests, and each
//! failed request is replayed exactly once with the new token. Callers see
//! none of this — `Client::send` either returns the final response or a
//! terminal error.
//!
//! Request flow:
//! 1. `Client::send` loads the credential and attaches `Authorization: Bearer`
//! 2. The `Transport` dispatches the request
//! 3. Non-401 responses (and network errors) go straight back to the caller
//! 4. A first 401 asks `RefreshCoordinator` for a token; concurrent 401s
//!    share the single in-flight exchange
//! 5. The request is reissued once with the new token; a second 401 is
//!    terminal (`Error::RetryExhausted`)
//!
//! A failed refresh clears the credential store, which the surrounding
//! application treats as "signed out".

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intercept;
pub mod metrics;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use coordinator::RefreshCoordinator;
pub use error::{Error, Result};
pub use intercept::{authorize, with_bearer};
pub use transport::{HttpTransport, Request, Response, Transport, TransportError};
