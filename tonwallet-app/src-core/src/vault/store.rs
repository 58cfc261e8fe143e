//! The secret store: durable, key-addressed persistence of vault values.
//!
//! The backend is opened lazily on first use and the handle is reused for the
//! lifetime of the store. Values are opaque strings (encrypted blobs or the
//! plain auth record); the store never inspects them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::backend::{KvBackend, StoreLocation};
use super::error::VaultResult;

/// Key holding the auth record.
pub const AUTH_KEY: &str = "auth";
/// Key holding the encrypted wallet list.
pub const WALLETS_KEY: &str = "wallets";

/// Exclusive right to run a read-modify-write cycle on one key.
///
/// Held across `get` → mutate → `save`; dropping it admits the next writer.
pub struct KeyGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

pub struct SecretStore {
    location: StoreLocation,
    backend: OnceCell<Arc<dyn KvBackend>>,
    writers: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SecretStore {
    /// Create a store for `location`. Nothing is opened until first use.
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            backend: OnceCell::new(),
            writers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store around an already open engine.
    pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            location: StoreLocation::Memory,
            backend: OnceCell::new_with(Some(backend)),
            writers: Mutex::new(HashMap::new()),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.backend.initialized()
    }

    /// Open-once accessor for the backend handle.
    ///
    /// A failed open is not cached; the next call retries.
    async fn handle(&self) -> VaultResult<&Arc<dyn KvBackend>> {
        self.backend
            .get_or_try_init(|| async {
                info!("Opening secret store ({:?})", self.location);
                self.location.open().await.inspect_err(|e| {
                    warn!("Failed to open secret store: {}", e);
                })
            })
            .await
    }

    /// Upsert `value` at `key`; last write wins.
    pub async fn save(&self, key: &str, value: &str) -> VaultResult<()> {
        self.handle().await?.put(key, value).await?;
        debug!("Saved vault entry '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    /// The value at `key`, or `None` if it was never set.
    pub async fn get(&self, key: &str) -> VaultResult<Option<String>> {
        self.handle().await?.get(key).await
    }

    /// Remove `key`. Missing keys are not an error.
    pub async fn delete(&self, key: &str) -> VaultResult<()> {
        self.handle().await?.remove(key).await?;
        debug!("Deleted vault entry '{}'", key);
        Ok(())
    }

    /// Remove every entry.
    pub async fn clear(&self) -> VaultResult<()> {
        info!("Clearing secret store - all entries will be lost!");
        self.handle().await?.clear().await
    }

    /// Whether at least one entry exists.
    pub async fn has(&self) -> VaultResult<bool> {
        Ok(self.handle().await?.count().await? > 0)
    }

    /// Wait for exclusive write access to `key`.
    ///
    /// Writers that go through this guard are applied one at a time in
    /// arrival order. Plain `save` calls bypass it and stay last-write-wins.
    pub async fn lock_key(&self, key: &str) -> KeyGuard {
        let slot = {
            let mut writers = self.writers.lock().await;
            writers
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        KeyGuard {
            key: key.to_string(),
            _guard: slot.lock_owned().await,
        }
    }
}
