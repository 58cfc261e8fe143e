//! Desktop authenticator backed by the OS keyring.
//!
//! - **macOS**: Keychain Access
//! - **Windows**: Credential Manager
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//!
//! Each credential is one keyring entry keyed by its id. Access is gated by
//! the unlocked OS session only; no prompt is shown. This authenticator
//! therefore never reports user verification, and it reports itself as
//! unavailable for verified unlock.

use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::*;
use crate::{random_base64url, PlatformAuthenticator};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "org.tonwallet.authn";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    rp_id: String,
    user_handle: String,
}

#[derive(Debug, Default)]
pub struct KeyringAuthenticator;

impl KeyringAuthenticator {
    pub fn new() -> Self {
        Self
    }

    fn entry(credential_id: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, credential_id).map_err(|e| {
            error!("Failed to create keyring entry: {}", e);
            Self::map_keyring_error(e)
        })
    }

    fn get_platform_method() -> AuthenticatorMethod {
        #[cfg(target_os = "macos")]
        {
            AuthenticatorMethod::MacOSKeychain
        }
        #[cfg(target_os = "windows")]
        {
            AuthenticatorMethod::WindowsCredentialManager
        }
        #[cfg(target_os = "linux")]
        {
            AuthenticatorMethod::LinuxSecretService
        }
    }

    fn map_keyring_error(err: keyring::Error) -> Error {
        match err {
            keyring::Error::NoEntry => Error::CredentialNotFound,
            keyring::Error::Ambiguous(_) => Error::Internal("Multiple keyring entries found".into()),
            keyring::Error::NoStorageAccess(e) => {
                Error::NotAvailable(format!("Keyring access denied: {:?}", e))
            }
            keyring::Error::PlatformFailure(e) => {
                let msg = format!("{:?}", e);
                if msg.contains("Dbus") || msg.contains("dbus") || msg.contains("D-Bus") {
                    Error::NotAvailable(format!(
                        "System keyring not available (D-Bus error): {}",
                        msg
                    ))
                } else {
                    Error::Internal(format!("Keyring error: {:?}", e))
                }
            }
            keyring::Error::BadEncoding(e) => {
                Error::Internal(format!("Keyring encoding error: {:?}", e))
            }
            _ => Error::Internal(format!("Keyring error: {}", err)),
        }
    }
}

#[async_trait]
impl PlatformAuthenticator for KeyringAuthenticator {
    async fn check_availability(&self) -> AuthenticatorStatus {
        warn!("{:?} cannot verify the user", Self::get_platform_method());
        AuthenticatorStatus {
            available: false,
            method: Some(Self::get_platform_method()),
            unavailable_reason: Some(
                "OS keyring stores credentials but cannot verify the user".into(),
            ),
        }
    }

    async fn create_credential(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<RegisteredCredential> {
        let credential_id = random_base64url::<16>();
        let stored = StoredCredential {
            rp_id: options.rp.id.clone(),
            user_handle: options.user.id.clone(),
        };
        let encoded =
            serde_json::to_string(&stored).map_err(|e| Error::Internal(e.to_string()))?;

        Self::entry(&credential_id)?
            .set_password(&encoded)
            .map_err(|e| {
                error!("Failed to store credential in keyring: {:?}", e);
                Self::map_keyring_error(e)
            })?;

        // Read back through a fresh Entry so a cached value cannot mask a failed write.
        let readback = Self::entry(&credential_id)?.get_password().map_err(|e| {
            error!("Credential verification failed - cannot read back: {:?}", e);
            Error::Internal(format!("Keyring verification failed: {:?}", e))
        })?;
        if readback != encoded {
            error!("Credential verification failed - stored data doesn't match!");
            return Err(Error::Internal(
                "Keyring verification failed: data mismatch".into(),
            ));
        }

        info!("Registered keyring credential for rp {}", options.rp.id);
        Ok(RegisteredCredential {
            credential_id,
            public_key: String::new(),
        })
    }

    async fn get_assertion(&self, request: AssertionRequest) -> Result<Assertion> {
        for credential_id in &request.allow_credentials {
            let encoded = match Self::entry(credential_id)?.get_password() {
                Ok(encoded) => encoded,
                Err(keyring::Error::NoEntry) => continue,
                Err(e) => return Err(Self::map_keyring_error(e)),
            };
            let stored: StoredCredential = serde_json::from_str(&encoded)
                .map_err(|e| Error::Internal(format!("Corrupt keyring credential: {}", e)))?;
            if stored.rp_id != request.rp_id {
                debug!("Credential {} belongs to another relying party", credential_id);
                continue;
            }
            // Keyring access proves an unlocked OS session, not the user.
            return Ok(Assertion {
                credential_id: credential_id.clone(),
                challenge: request.challenge,
                user_verified: false,
            });
        }
        Err(Error::CredentialNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyring_is_not_a_user_verifying_authenticator() {
        let status = KeyringAuthenticator::new().check_availability().await;
        assert!(!status.available);
        assert_eq!(status.method, Some(KeyringAuthenticator::get_platform_method()));
        assert!(status.unavailable_reason.is_some());
    }
}
