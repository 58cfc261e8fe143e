//! Persistence engines behind the secret store.
//!
//! The store only needs a flat string → string table. Two engines provide it:
//! - `FileBackend`: one JSON document on disk, rewritten atomically on every
//!   mutation (write to a temp file, then rename)
//! - `MemoryBackend`: process-local, for ephemeral sessions and tests

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::{VaultError, VaultResult};

/// On-disk document format version.
const STORE_FORMAT_VERSION: u32 = 1;

/// A key-value persistence engine.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> VaultResult<()>;
    async fn get(&self, key: &str) -> VaultResult<Option<String>>;
    async fn remove(&self, key: &str) -> VaultResult<()>;
    async fn clear(&self) -> VaultResult<()>;
    async fn count(&self) -> VaultResult<usize>;
}

/// Where the store keeps its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    /// Open the engine for this location.
    pub async fn open(&self) -> VaultResult<Arc<dyn KvBackend>> {
        match self {
            StoreLocation::File(path) => Ok(Arc::new(FileBackend::open(path.clone()).await?)),
            StoreLocation::Memory => Ok(Arc::new(MemoryBackend::new())),
        }
    }
}

// ============================================================================
// File backend
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Load the store file at `path`, or start empty if it does not exist.
    pub async fn open(path: PathBuf) -> VaultResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let entries = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read(&path).await?;
            let document: StoreDocument = serde_json::from_slice(&content).map_err(|e| {
                VaultError::StorageUnavailable(format!("Store file corrupted: {}", e))
            })?;
            if document.version != STORE_FORMAT_VERSION {
                return Err(VaultError::StorageUnavailable(format!(
                    "Unsupported store format version {}",
                    document.version
                )));
            }
            debug!("Loaded {} entries from {:?}", document.entries.len(), path);
            document.entries
        } else {
            info!("Creating new store at {:?}", path);
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` as the new file contents.
    ///
    /// Either the old or the new document is on disk afterwards, never a mix.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> VaultResult<()> {
        let document = StoreDocument {
            version: STORE_FORMAT_VERSION,
            entries: entries.clone(),
        };
        let content = serde_json::to_vec(&document)
            .map_err(|e| VaultError::StorageUnavailable(format!("Failed to encode store: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await?;

        // Entries hold PIN digests and encrypted mnemonics
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    /// Apply `mutate` to a copy, persist it, and only then publish it.
    async fn commit<F>(&self, mutate: F) -> VaultResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let mut guard = self.entries.write().await;
        let mut next = guard.clone();
        mutate(&mut next);
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }
}

#[async_trait]
impl KvBackend for FileBackend {
    async fn put(&self, key: &str, value: &str) -> VaultResult<()> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn get(&self, key: &str) -> VaultResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> VaultResult<()> {
        if !self.entries.read().await.contains_key(key) {
            return Ok(());
        }
        self.commit(|entries| {
            entries.remove(key);
        })
        .await
    }

    async fn clear(&self) -> VaultResult<()> {
        self.commit(|entries| entries.clear()).await
    }

    async fn count(&self) -> VaultResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

// ============================================================================
// Memory backend
// ============================================================================

#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn put(&self, key: &str, value: &str) -> VaultResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> VaultResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> VaultResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> VaultResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> VaultResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let backend = FileBackend::open(path.clone()).await.unwrap();
        backend.put("auth", "a").await.unwrap();
        backend.put("wallets", "w").await.unwrap();
        backend.remove("wallets").await.unwrap();
        drop(backend);

        let reopened = FileBackend::open(path).await.unwrap();
        assert_eq!(reopened.get("auth").await.unwrap().as_deref(), Some("a"));
        assert_eq!(reopened.get("wallets").await.unwrap(), None);
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_backend_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("vault.json");

        let backend = FileBackend::open(path.clone()).await.unwrap();
        backend.put("k", "v").await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_backend_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result = FileBackend::open(path).await;
        assert!(matches!(result, Err(VaultError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_file_backend_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        std::fs::write(&path, br#"{"version":99,"entries":{}}"#).unwrap();

        let result = FileBackend::open(path).await;
        assert!(matches!(result, Err(VaultError::StorageUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_backend_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let backend = FileBackend::open(path.clone()).await.unwrap();
        backend.put("auth", "x").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_memory_backend_clear() {
        let backend = MemoryBackend::new();
        backend.put("a", "1").await.unwrap();
        backend.put("b", "2").await.unwrap();
        assert_eq!(backend.count().await.unwrap(), 2);
        backend.clear().await.unwrap();
        assert_eq!(backend.count().await.unwrap(), 0);
    }
}
