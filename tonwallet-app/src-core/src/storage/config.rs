use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::vault::KdfScheme;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Vault file location. `None` keeps entries in memory only.
    pub store_path: Option<PathBuf>,
    /// Key derivation used for newly written blobs.
    pub kdf_scheme: KdfScheme,
    pub relying_party_id: String,
    pub relying_party_name: String,
    pub biometric_timeout_ms: u64,
    pub min_pin_length: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store_path: Some(PathBuf::from("vault.json")),
            kdf_scheme: KdfScheme::Pbkdf2Sha256,
            relying_party_id: "localhost".to_string(),
            relying_party_name: "TON Jetton Wallet".to_string(),
            biometric_timeout_ms: 60_000,
            min_pin_length: 4,
        }
    }
}

impl AppSettings {
    /// Settings for a throwaway session with nothing written to disk.
    pub fn ephemeral() -> Self {
        Self {
            store_path: None,
            ..Self::default()
        }
    }
}

pub fn load_settings(path: &Path) -> Result<AppSettings> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: AppSettings = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Invalid settings file {:?}: {}", path, e)))?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.biometric_timeout_ms, 60_000);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.json");
        let settings = AppSettings {
            kdf_scheme: KdfScheme::Argon2id,
            min_pin_length: 6,
            ..AppSettings::ephemeral()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "min_pin_length": 6, "kdf_scheme": "argon2id" }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.min_pin_length, 6);
        assert_eq!(settings.kdf_scheme, KdfScheme::Argon2id);
        assert_eq!(settings.relying_party_id, "localhost");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_settings(&path), Err(AppError::Config(_))));
    }
}
