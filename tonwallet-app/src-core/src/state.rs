use std::sync::Arc;
use std::time::Duration;

use tonwallet_authn::{PlatformAuthenticator, RelyingParty};
use tracing::info;

use crate::error::Result;
use crate::storage::AppSettings;
use crate::vault::{AuthManager, BiometricCoordinator, SecretStore, StoreLocation};
use crate::wallet::WalletVault;

/// Everything the command layer needs, built once at startup.
pub struct AppState {
    pub settings: AppSettings,
    pub store: Arc<SecretStore>,
    pub auth: AuthManager,
    pub wallets: WalletVault,
}

impl AppState {
    /// Wire up the vault from `settings` and read the initial auth status.
    pub async fn open(
        settings: AppSettings,
        authenticator: Arc<dyn PlatformAuthenticator>,
    ) -> Result<Self> {
        let location = match &settings.store_path {
            Some(path) => StoreLocation::File(path.clone()),
            None => StoreLocation::Memory,
        };
        let store = Arc::new(SecretStore::new(location));

        let biometric = BiometricCoordinator::new(
            authenticator,
            RelyingParty {
                id: settings.relying_party_id.clone(),
                name: settings.relying_party_name.clone(),
            },
            Duration::from_millis(settings.biometric_timeout_ms),
        );
        let auth = AuthManager::new(store.clone(), biometric, settings.min_pin_length);
        let wallets = WalletVault::new(store.clone(), settings.kdf_scheme);

        let status = auth.init().await?;
        info!("App state ready (auth: {}, store: {:?})", status, store.location());

        Ok(Self {
            settings,
            store,
            auth,
            wallets,
        })
    }
}
