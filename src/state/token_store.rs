//! Persisted bearer token and cached user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Holds exactly two entries, `access_token` and `user` (JSON-encoded), in a
//! single key-value document. Both entries are written and removed together;
//! no validation happens here.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::net::types::User;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// What `load` found. Either entry may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<User>,
}

/// Durable storage for the session token and user snapshot.
pub trait TokenStore: Send + Sync {
    /// Persist both entries, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError>;

    /// Read both entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage exists but cannot be read.
    fn load(&self) -> Result<StoredSession, StorageError>;

    /// Remove both entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;

    /// Whether a token is currently stored. Unreadable storage counts as absent.
    fn has_token(&self) -> bool {
        self.load().is_ok_and(|stored| stored.token.is_some())
    }
}

type Entries = BTreeMap<String, String>;

fn encode_entries(token: &str, user: &User) -> Result<Entries, StorageError> {
    let mut entries = Entries::new();
    entries.insert(ACCESS_TOKEN_KEY.to_owned(), token.to_owned());
    entries.insert(USER_KEY.to_owned(), serde_json::to_string(user)?);
    Ok(entries)
}

fn decode_entries(entries: &Entries) -> StoredSession {
    let token = entries.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty()).cloned();
    let user = entries.get(USER_KEY).and_then(|raw| match serde_json::from_str::<User>(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "cached user unreadable; ignoring");
            None
        }
    });
    StoredSession { token, user }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON document on disk. Survives restarts of the hosting shell.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_vec_pretty(&encode_entries(token, user)?)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent)?;
        }
        // Readers never observe a half-written document.
        let tmp = self.temp_path();
        write_private(&tmp, &raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<StoredSession, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredSession::default()),
            Err(e) => return Err(e.into()),
        };
        let entries: Entries = serde_json::from_slice(&raw)?;
        Ok(decode_entries(&entries))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create `dir` and any missing parents, owner-only on unix.
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Write `raw` to `path`, readable and writable by the owner only on unix.
fn write_private(path: &Path, raw: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // A leftover temp file keeps its old mode; tighten it explicitly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(raw)?;
    file.sync_all()
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<Entries>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw key-value view, as a browser's storage inspector would show it.
    #[must_use]
    pub fn raw_entries(&self) -> BTreeMap<String, String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let encoded = encode_entries(token, user)?;
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = encoded;
        Ok(())
    }

    fn load(&self) -> Result<StoredSession, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(decode_entries(&entries))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(())
    }
}
