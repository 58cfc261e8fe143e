//! Vault-specific error types for secure storage operations.
//!
//! Errors are granular enough for the command layer to pick a user-facing
//! message, and serialize as `{ code, message }` for the UI.

use thiserror::Error;

/// Errors that can occur during vault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Authenticated decryption failed. Wrong PIN and damaged data are
    /// deliberately indistinguishable.
    #[error("Invalid PIN or corrupted data")]
    InvalidCredentialOrCorruptData,

    /// The PIN digest did not match the stored one.
    #[error("Incorrect PIN")]
    IncorrectPin,

    /// The PIN does not meet the configured policy.
    #[error("PIN must be at least {0} characters")]
    InvalidPinFormat(usize),

    /// No PIN has been set up yet.
    /// User needs to complete onboarding first.
    #[error("No PIN set up")]
    NoPinConfigured,

    /// A PIN is already configured; reset first.
    #[error("PIN already set up")]
    AlreadySetup,

    /// The wallet is locked and requires authentication.
    #[error("Wallet is locked")]
    Locked,

    /// The persistence engine failed (I/O, quota, corrupt store file).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// No user-verifying platform authenticator.
    #[error("Biometric authentication unavailable: {0}")]
    BiometricUnavailable(String),

    /// User cancelled or the platform refused to create a credential.
    #[error("Biometric registration failed: {0}")]
    RegistrationFailed(String),

    /// Biometric authentication was requested without a credential id.
    #[error("No biometric credential found")]
    MissingCredential,

    /// A PIN exists but no biometric credential has been linked.
    #[error("Biometric not set up")]
    BiometricNotLinked,

    #[error("No wallet at index {0}")]
    InvalidWalletIndex(usize),

    /// An error occurred in the encryption layer.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for vault operations.
pub type VaultResult<T> = std::result::Result<T, VaultError>;

impl VaultError {
    /// Stable error code for programmatic handling by the UI.
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::InvalidCredentialOrCorruptData => "INVALID_CREDENTIAL_OR_CORRUPT_DATA",
            VaultError::IncorrectPin => "INCORRECT_PIN",
            VaultError::InvalidPinFormat(_) => "INVALID_PIN_FORMAT",
            VaultError::NoPinConfigured => "NO_PIN_CONFIGURED",
            VaultError::AlreadySetup => "ALREADY_SETUP",
            VaultError::Locked => "LOCKED",
            VaultError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            VaultError::BiometricUnavailable(_) => "BIOMETRIC_UNAVAILABLE",
            VaultError::RegistrationFailed(_) => "REGISTRATION_FAILED",
            VaultError::MissingCredential => "MISSING_CREDENTIAL",
            VaultError::BiometricNotLinked => "BIOMETRIC_NOT_LINKED",
            VaultError::InvalidWalletIndex(_) => "INVALID_WALLET_INDEX",
            VaultError::Encryption(_) => "ENCRYPTION_ERROR",
            VaultError::KeyDerivation(_) => "KEY_DERIVATION_ERROR",
            VaultError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::StorageUnavailable(err.to_string())
    }
}

// ============================================================================
// Serialization for the UI bridge
// ============================================================================

impl serde::Serialize for VaultError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("VaultError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
