//! Key/value storage behind the session.
//!
//! The browser client kept its tokens in session storage under fixed keys.
//! The same keys are used here so that a token file written by one tool can be
//! read by another.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{SessionError, SessionResult};

/// Fixed storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AccessToken,
    AdminAccessToken,
    SignupToken,
    /// Serialised [`crate::SessionUser`] of the signed-in identity.
    Identity,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::AccessToken,
        StorageKey::AdminAccessToken,
        StorageKey::SignupToken,
        StorageKey::Identity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::AccessToken => "accessToken",
            StorageKey::AdminAccessToken => "adminAccessToken",
            StorageKey::SignupToken => "signupToken",
            StorageKey::Identity => "identity",
        }
    }
}

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: StorageKey) -> Option<String>;
    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()>;
    fn remove(&self, key: StorageKey) -> SessionResult<()>;

    fn contains(&self, key: StorageKey) -> bool {
        self.get(key).map(|value| !value.is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<&'static str, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.read().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()> {
        self.entries
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .insert(key.as_str(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> SessionResult<()> {
        self.entries
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .remove(key.as_str());
        Ok(())
    }
}

/// JSON file keyed by the storage key names. Every write flushes the whole map.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(error.into()),
        };

        debug!(path = %path.display(), keys = entries.len(), "opened session storage file");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.read().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.as_str().to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: StorageKey) -> SessionResult<()> {
        let mut entries = self.entries.write().map_err(|_| SessionError::Poisoned)?;
        if entries.remove(key.as_str()).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
