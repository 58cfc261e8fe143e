use thiserror::Error;

use crate::vault::VaultError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Message shown to the user.
    ///
    /// Decryption failures in the unlock flow read as a wrong PIN; the cipher
    /// itself cannot tell the two apart.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Vault(VaultError::InvalidCredentialOrCorruptData)
            | AppError::Vault(VaultError::IncorrectPin) => "Incorrect PIN".to_string(),
            other => other.to_string(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_to_app_error() {
        let app_err: AppError = VaultError::NoPinConfigured.into();
        assert!(matches!(app_err, AppError::Vault(VaultError::NoPinConfigured)));
        assert_eq!(app_err.to_string(), "No PIN set up");
    }

    #[test]
    fn test_decrypt_failure_reads_as_incorrect_pin() {
        let app_err: AppError = VaultError::InvalidCredentialOrCorruptData.into();
        assert_eq!(app_err.user_message(), "Incorrect PIN");

        let app_err: AppError = VaultError::StorageUnavailable("quota".into()).into();
        assert_eq!(app_err.user_message(), "Storage unavailable: quota");
    }
}
