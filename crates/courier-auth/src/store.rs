//! Credential storage
//!
//! `CredentialStore` abstracts where the signed-in credential lives so the
//! client can run against a JSON file on desktop, an in-memory slot in tests,
//! or an application-provided backend (keychain, encrypted prefs). The whole
//! credential is read and replaced as one unit; there is no per-field access.
//!
//! `FileCredentialStore` writes use atomic temp-file + rename to prevent
//! corruption on crash, with a tokio Mutex serializing concurrent writers.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::{Error, Result};

/// Persisted storage for the sign-in credential.
///
/// Implementations must be safe to call from inside the refresh
/// coordinator's critical section: no shared mutable state beyond their own
/// synchronization.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn CredentialStore>`).
pub trait CredentialStore: Send + Sync {
    /// Read the current credential, if one is stored.
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<Credential>>> + Send + '_>>;

    /// Replace the stored credential wholesale.
    fn save(&self, credential: Credential) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Remove the stored credential (sign-out, unrecoverable refresh failure).
    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// JSON-file-backed credential store.
///
/// The file holds one serialized `Credential`. A missing file reads as "not
/// signed in" rather than an error, so first launch needs no setup step.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes writers; reads go to disk so external sign-in flows that
    // replace the file are picked up without restarting the client.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_file(&self) -> Result<Option<Credential>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let credential: Credential = serde_json::from_str(&contents)
                    .map_err(|e| Error::Parse(format!("parsing credential file: {e}")))?;
                Ok(Some(credential))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(format!("reading credential file: {e}"))),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<Credential>>> + Send + '_>> {
        Box::pin(self.read_file())
    }

    fn save(&self, credential: Credential) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            write_atomic(&self.path, &credential).await?;
            debug!(path = %self.path.display(), "persisted credential");
            Ok(())
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {
                    info!(path = %self.path.display(), "cleared credential");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::Io(format!("removing credential file: {e}"))),
            }
        })
    }
}

/// In-memory credential store.
///
/// Used by tests and by applications that never persist tokens to disk
/// (the credential then lives exactly as long as the process).
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct with an initial credential already present.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<Credential>>> + Send + '_>> {
        Box::pin(async move { Ok(self.slot.lock().await.clone()) })
    }

    fn save(&self, credential: Credential) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            *self.slot.lock().await = Some(credential);
            Ok(())
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            *self.slot.lock().await = None;
            Ok(())
        })
    }
}

/// Write a credential to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only) since the file
/// contains bearer tokens.
async fn write_atomic(path: &Path, credential: &Credential) -> Result<()> {
    let json = serde_json::to_string_pretty(credential)
        .map_err(|e| Error::Parse(format!("serializing credential: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credential.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    Ok(())
}
