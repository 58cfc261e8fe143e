//! AuthManager - PIN and biometric lifecycle on top of the secret store.
//!
//! Handles:
//! - First-time PIN setup
//! - Unlocking with the PIN or a linked biometric credential
//! - Linking a biometric credential to an existing PIN
//! - Locking, and the destructive reset that wipes every vault entry
//!
//! The `auth` entry holds the PIN digest, not the PIN. Secrets such as
//! mnemonics are protected separately by PBKDF2-derived keys.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::auth::{AuthRecord, AuthStatus, AuthSummary};
use super::biometric::BiometricCoordinator;
use super::cipher::hash_pin;
use super::error::{VaultError, VaultResult};
use super::store::{SecretStore, AUTH_KEY, WALLETS_KEY};

pub struct AuthManager {
    store: Arc<SecretStore>,
    biometric: BiometricCoordinator,
    status: RwLock<AuthStatus>,
    min_pin_length: usize,
}

impl AuthManager {
    pub fn new(store: Arc<SecretStore>, biometric: BiometricCoordinator, min_pin_length: usize) -> Self {
        Self {
            store,
            biometric,
            status: RwLock::new(AuthStatus::NotSetup),
            min_pin_length,
        }
    }

    pub fn biometric(&self) -> &BiometricCoordinator {
        &self.biometric
    }

    /// Read the stored record and derive the initial status.
    pub async fn init(&self) -> VaultResult<AuthStatus> {
        let status = match self.load_record().await? {
            Some(_) => AuthStatus::Locked,
            None => AuthStatus::NotSetup,
        };
        *self.status.write().await = status;
        info!("Auth initialized: {}", status);
        Ok(status)
    }

    pub async fn status(&self) -> AuthStatus {
        *self.status.read().await
    }

    pub async fn is_unlocked(&self) -> bool {
        self.status().await == AuthStatus::Unlocked
    }

    pub async fn summary(&self) -> VaultResult<AuthSummary> {
        let record = self.load_record().await?;
        Ok(AuthSummary {
            status: self.status().await,
            has_pin: record.is_some(),
            has_biometric: record.as_ref().is_some_and(AuthRecord::has_biometric),
        })
    }

    /// Set the PIN for the first time and unlock.
    pub async fn setup_pin(&self, pin: &str) -> VaultResult<()> {
        if pin.chars().count() < self.min_pin_length {
            return Err(VaultError::InvalidPinFormat(self.min_pin_length));
        }

        let _guard = self.store.lock_key(AUTH_KEY).await;
        if self.load_record().await?.is_some() {
            return Err(VaultError::AlreadySetup);
        }

        let record = AuthRecord::new(hash_pin(pin));
        self.save_record(&record).await?;
        *self.status.write().await = AuthStatus::Unlocked;

        info!("PIN set up");
        Ok(())
    }

    /// Check `pin` against the stored digest.
    pub async fn unlock_with_pin(&self, pin: &str) -> VaultResult<()> {
        let record = self
            .load_record()
            .await?
            .ok_or(VaultError::NoPinConfigured)?;

        if let Err(e) = record.check_pin(pin) {
            warn!("Unlock rejected: incorrect PIN");
            return Err(e);
        }

        *self.status.write().await = AuthStatus::Unlocked;
        info!("Unlocked with PIN");
        Ok(())
    }

    /// Unlock through the linked platform credential.
    ///
    /// `Ok(false)` means the user did not verify; the UI falls back to the PIN.
    pub async fn unlock_with_biometric(&self) -> VaultResult<bool> {
        let record = self
            .load_record()
            .await?
            .ok_or(VaultError::NoPinConfigured)?;
        let credential_id = record
            .biometric_credential_id
            .filter(|id| !id.is_empty())
            .ok_or(VaultError::BiometricNotLinked)?;

        let verified = self
            .biometric
            .authenticate_with_biometric(&credential_id)
            .await?;
        if verified {
            *self.status.write().await = AuthStatus::Unlocked;
            info!("Unlocked with biometric");
        }
        Ok(verified)
    }

    /// Attach an already registered credential id to the auth record.
    pub async fn link_biometric(&self, credential_id: &str) -> VaultResult<()> {
        if credential_id.is_empty() {
            return Err(VaultError::MissingCredential);
        }

        let _guard = self.store.lock_key(AUTH_KEY).await;
        let mut record = self
            .load_record()
            .await?
            .ok_or(VaultError::NoPinConfigured)?;
        record.biometric_credential_id = Some(credential_id.to_string());
        self.save_record(&record).await?;

        info!("Biometric credential linked");
        Ok(())
    }

    /// Register a new platform credential for `username` and link it.
    pub async fn enable_biometric(&self, username: &str) -> VaultResult<String> {
        if self.load_record().await?.is_none() {
            return Err(VaultError::NoPinConfigured);
        }
        let credential_id = self.biometric.register_biometric(username).await?;
        self.link_biometric(&credential_id).await?;
        Ok(credential_id)
    }

    pub async fn lock(&self) {
        let mut status = self.status.write().await;
        if *status == AuthStatus::Unlocked {
            *status = AuthStatus::Locked;
            info!("Locked");
        }
    }

    /// Wipe every vault entry (auth record and wallets).
    ///
    /// # Warning
    /// All encrypted data will be permanently lost!
    pub async fn reset(&self) -> VaultResult<()> {
        // Lock order: `auth` before `wallets`. An in-flight wallet write
        // finishes first and is then wiped with everything else.
        let _auth = self.store.lock_key(AUTH_KEY).await;
        let _wallets = self.store.lock_key(WALLETS_KEY).await;
        self.store.clear().await?;
        *self.status.write().await = AuthStatus::NotSetup;
        info!("Vault reset");
        Ok(())
    }

    async fn load_record(&self) -> VaultResult<Option<AuthRecord>> {
        let record = AuthRecord::load(&self.store).await?;
        if record.is_some() {
            debug!("Loaded auth record");
        }
        Ok(record)
    }

    async fn save_record(&self, record: &AuthRecord) -> VaultResult<()> {
        let raw = serde_json::to_string(record)?;
        self.store.save(AUTH_KEY, &raw).await
    }
}
