//! Credential model and storage for the Courier API client
//!
//! Owns the persisted sign-in state: one `Credential` (access token, refresh
//! token, optional user id) behind a `CredentialStore`. The client crate only
//! ever reads the credential or replaces it wholesale — partial updates are
//! not part of the interface, so a refresh can never leave a mixed old/new
//! token pair behind.
//!
//! Credential flow:
//! 1. Application signs in and stores the initial `Credential` via `save()`
//! 2. The client reads it at request time to attach the bearer token
//! 3. On refresh success the coordinator replaces it via `save()`
//! 4. On refresh failure or sign-out it is removed via `clear()`

pub mod credential;
pub mod error;
pub mod store;
pub mod token;

pub use credential::Credential;
pub use error::{Error, Result};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use token::{RefreshRequest, RefreshResponse};
