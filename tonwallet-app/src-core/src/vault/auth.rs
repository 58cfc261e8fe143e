//! Vault authentication types.

use serde::{Deserialize, Serialize};

use super::cipher::verify_pin;
use super::error::{VaultError, VaultResult};
use super::store::{SecretStore, AUTH_KEY};

/// Represents the current state of the wallet lock.
///
/// The status transitions between these states:
/// - `NotSetup` → `Unlocked` (after first-time PIN setup)
/// - `Unlocked` → `Locked` (when user locks)
/// - `Locked` → `Unlocked` (after PIN or biometric unlock)
/// - any → `NotSetup` (after reset)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AuthStatus {
    /// No PIN has been configured yet (first-time user)
    #[default]
    NotSetup,
    /// A PIN exists but the wallet is locked
    Locked,
    /// The user has authenticated in this session
    Unlocked,
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSetup => write!(f, "NotSetup"),
            Self::Locked => write!(f, "Locked"),
            Self::Unlocked => write!(f, "Unlocked"),
        }
    }
}

/// Record stored under the `auth` key.
///
/// Kept as plain JSON so the unlock check needs no key derivation. It holds
/// only a one-way PIN digest and an opaque credential id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub pin_hash: String,
    #[serde(default)]
    pub biometric_credential_id: Option<String>,
}

impl AuthRecord {
    pub fn new(pin_hash: String) -> Self {
        Self {
            pin_hash,
            biometric_credential_id: None,
        }
    }

    pub fn has_biometric(&self) -> bool {
        self.biometric_credential_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    /// Read the record stored under `auth`, if any.
    ///
    /// A record that does not parse is a storage fault, not a missing PIN.
    pub async fn load(store: &SecretStore) -> VaultResult<Option<Self>> {
        match store.get(AUTH_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                VaultError::StorageUnavailable(format!("Auth record corrupted: {}", e))
            }),
            None => Ok(None),
        }
    }

    /// Check `pin` against the stored digest.
    pub fn check_pin(&self, pin: &str) -> VaultResult<()> {
        if verify_pin(pin, &self.pin_hash) {
            Ok(())
        } else {
            Err(VaultError::IncorrectPin)
        }
    }
}

/// Snapshot of auth state for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSummary {
    pub status: AuthStatus,
    pub has_pin: bool,
    pub has_biometric: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_record_wire_shape() {
        let record = AuthRecord::new("abc".into());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"pinHash":"abc","biometricCredentialId":null}"#);
    }

    #[test]
    fn test_auth_record_accepts_missing_credential_field() {
        let record: AuthRecord = serde_json::from_str(r#"{"pinHash":"abc"}"#).unwrap();
        assert_eq!(record.biometric_credential_id, None);
        assert!(!record.has_biometric());
    }

    #[test]
    fn test_empty_credential_id_is_not_biometric() {
        let mut record = AuthRecord::new("abc".into());
        record.biometric_credential_id = Some(String::new());
        assert!(!record.has_biometric());
        record.biometric_credential_id = Some("cred".into());
        assert!(record.has_biometric());
    }

    #[test]
    fn test_check_pin() {
        let record = AuthRecord::new(crate::vault::cipher::hash_pin("1234"));
        assert!(record.check_pin("1234").is_ok());
        assert!(matches!(record.check_pin("4321"), Err(VaultError::IncorrectPin)));
    }
}
