//! Encrypted wallet list.
//!
//! The whole [`WalletsSnapshot`] is sealed under the PIN and written to the
//! `wallets` key on every change. Changes run under the store's per-key
//! guard, so concurrent callers are applied one after another instead of
//! overwriting each other.
//!
//! Every operation first checks the PIN against the auth record. A blob is
//! never sealed under a PIN that cannot unlock the vault.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::models::{JettonBalance, WalletRecord, WalletsSnapshot};
use crate::vault::cipher::{self, KdfScheme};
use crate::vault::{AuthRecord, SecretStore, VaultError, VaultResult, WALLETS_KEY};

pub struct WalletVault {
    store: Arc<SecretStore>,
    scheme: KdfScheme,
}

impl WalletVault {
    pub fn new(store: Arc<SecretStore>, scheme: KdfScheme) -> Self {
        Self { store, scheme }
    }

    /// Decrypt the wallet list. An empty snapshot if nothing was saved yet.
    pub async fn load(&self, pin: &str) -> VaultResult<WalletsSnapshot> {
        self.authorize(pin).await?;
        self.read(pin).await
    }

    /// Replace the stored wallet list.
    pub async fn save(&self, pin: &str, snapshot: &WalletsSnapshot) -> VaultResult<()> {
        let _guard = self.store.lock_key(WALLETS_KEY).await;
        self.authorize(pin).await?;
        self.write(pin, snapshot.clone()).await
    }

    /// Append a wallet and make it active.
    pub async fn add_wallet(
        &self,
        pin: &str,
        name: &str,
        address: &str,
        mnemonic: &str,
    ) -> VaultResult<WalletRecord> {
        let wallet = self
            .mutate(pin, |snapshot| {
                let wallet = WalletRecord {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    address: address.to_string(),
                    mnemonic: mnemonic.to_string(),
                    balance: 0.0,
                    jettons: Vec::new(),
                };
                snapshot.wallets.push(wallet.clone());
                snapshot.active_wallet_index = snapshot.wallets.len() - 1;
                Ok(wallet)
            })
            .await?;

        info!("Added wallet {} ({})", wallet.name, wallet.address);
        Ok(wallet)
    }

    pub async fn set_active(&self, pin: &str, index: usize) -> VaultResult<()> {
        self.mutate(pin, |snapshot| {
            if index >= snapshot.wallets.len() {
                return Err(VaultError::InvalidWalletIndex(index));
            }
            snapshot.active_wallet_index = index;
            Ok(())
        })
        .await
    }

    /// Flip between testnet and mainnet; returns the new `is_testnet`.
    pub async fn toggle_network(&self, pin: &str) -> VaultResult<bool> {
        self.mutate(pin, |snapshot| {
            snapshot.is_testnet = !snapshot.is_testnet;
            Ok(snapshot.is_testnet)
        })
        .await
    }

    /// Record freshly fetched balances for the wallet at `index`.
    pub async fn update_balances(
        &self,
        pin: &str,
        index: usize,
        balance: f64,
        jettons: Vec<JettonBalance>,
    ) -> VaultResult<()> {
        self.mutate(pin, |snapshot| {
            let wallet = snapshot
                .wallets
                .get_mut(index)
                .ok_or(VaultError::InvalidWalletIndex(index))?;
            wallet.balance = balance;
            wallet.jettons = jettons;
            Ok(())
        })
        .await
    }

    pub async fn active_wallet(&self, pin: &str) -> VaultResult<Option<WalletRecord>> {
        self.authorize(pin).await?;
        Ok(self.read(pin).await?.active_wallet().cloned())
    }

    /// Read, change and write back the snapshot under the key guard.
    ///
    /// Nothing is written if `change` fails.
    async fn mutate<R, F>(&self, pin: &str, change: F) -> VaultResult<R>
    where
        F: FnOnce(&mut WalletsSnapshot) -> VaultResult<R>,
    {
        let _guard = self.store.lock_key(WALLETS_KEY).await;
        self.authorize(pin).await?;
        let mut snapshot = self.read(pin).await?;
        let result = change(&mut snapshot)?;
        self.write(pin, snapshot).await?;
        Ok(result)
    }

    /// The PIN must match the auth record. After a reset there is no record,
    /// so a queued write fails instead of landing in the wiped store.
    async fn authorize(&self, pin: &str) -> VaultResult<()> {
        let record = AuthRecord::load(&self.store)
            .await?
            .ok_or(VaultError::NoPinConfigured)?;
        record.check_pin(pin).inspect_err(|_| {
            warn!("Wallet access rejected: PIN does not match auth record");
        })
    }

    async fn read(&self, pin: &str) -> VaultResult<WalletsSnapshot> {
        match self.store.get(WALLETS_KEY).await? {
            Some(blob) => {
                let snapshot: WalletsSnapshot =
                    cipher::open(blob, Zeroizing::new(pin.to_string())).await?;
                debug!("Loaded {} wallets from vault", snapshot.wallets.len());
                Ok(snapshot)
            }
            None => Ok(WalletsSnapshot::default()),
        }
    }

    async fn write(&self, pin: &str, snapshot: WalletsSnapshot) -> VaultResult<()> {
        let count = snapshot.wallets.len();
        let blob = cipher::seal(self.scheme, snapshot, Zeroizing::new(pin.to_string())).await?;
        self.store.save(WALLETS_KEY, &blob).await?;
        debug!("Stored {} wallets in vault", count);
        Ok(())
    }
}
