//! Keyed blob storage behind the cart and wishlist.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

/// Storage keys, scoped per client session
pub mod keys {
    pub const CART: &str = "luxio_cart";
    pub const WISHLIST: &str = "luxio_wishlist";

    pub fn scoped(session: &str, key: &str) -> String {
        format!("{}:{}", session, key)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Storage adapter trait so the same cart logic can run on a file, a
/// session store, or memory in tests.
pub trait StorageAdapter: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage adapter. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.store.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut store = self.store.write().map_err(|_| StorageError::Poisoned)?;
        store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut store = self.store.write().map_err(|_| StorageError::Poisoned)?;
        store.remove(key);
        Ok(())
    }
}

/// File-based storage adapter: every key lives in one JSON object on disk,
/// rewritten on each change.
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, loading existing contents. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let cache = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Write to a sibling temp file and rename it over the target, so a
    /// crash mid-write never leaves a truncated store behind.
    fn save(&self, contents: &HashMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(contents)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            self.io_error(e)
        })
    }

    /// Apply `change` to a copy of the cache and persist it. The cache is
    /// only replaced once the file is written.
    fn commit(&self, change: impl FnOnce(&mut HashMap<String, String>) -> bool) -> Result<(), StorageError> {
        let mut cache = self.cache.write().map_err(|_| StorageError::Poisoned)?;
        let mut next = cache.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.save(&next)?;
        *cache = next;
        Ok(())
    }
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.commit(|next| {
            next.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.commit(|next| next.remove(key).is_some())
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}
