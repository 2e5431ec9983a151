//! Persisted credential slot
//!
//! Exactly one token is persisted per process. The file store keeps it at
//! the configured `token_path`; the memory store serves tests and
//! throwaway sessions.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::TokenStoreError;

/// Well-known name of the single credential slot
pub const TOKEN_SLOT: &str = "token";

/// Storage for the session token
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    /// Persist `token`, replacing any previous value
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the persisted token. Succeeds when nothing is stored
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token persisted in a file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by `path`. Nothing is touched until first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Write `token` to `path`, readable by the owner only on unix
fn write_private(path: &Path, token: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_private(&self.path, token)?;
        info!("Persisted {} at {}", TOKEN_SLOT, self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed {} at {}", TOKEN_SLOT, self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {} to remove at {}", TOKEN_SLOT, self.path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Token held in memory only
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts with `token` already persisted
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_save_load_clear() -> Result<(), TokenStoreError> {
        let dir = tempfile::tempdir()?;
        let store = FileTokenStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load()?, None);

        store.save("secret-token")?;
        assert_eq!(store.load()?, Some("secret-token".to_string()));

        store.save("rotated")?;
        assert_eq!(store.load()?, Some("rotated".to_string()));

        store.clear()?;
        assert_eq!(store.load()?, None);

        // Clearing an empty slot is fine
        store.clear()?;
        Ok(())
    }

    #[test]
    fn test_file_store_ignores_blank_file() -> Result<(), TokenStoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("token");
        fs::write(&path, "  \n")?;

        assert_eq!(FileTokenStore::new(path).load()?, None);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() -> Result<(), TokenStoreError> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("token");
        let store = FileTokenStore::new(&path);

        store.save("secret-token")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o600);

        // An existing file with wider permissions is narrowed on save
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;
        store.save("rotated")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o600);
        assert_eq!(store.load()?, Some("rotated".to_string()));
        Ok(())
    }

    #[test]
    fn test_memory_store() -> Result<(), TokenStoreError> {
        let store = MemoryTokenStore::with_token("abc");
        assert_eq!(store.load()?, Some("abc".to_string()));

        store.clear()?;
        assert_eq!(store.load()?, None);
        Ok(())
    }
}
