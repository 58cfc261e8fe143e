//! PIN-based key derivation and authenticated encryption of vault values.
//!
//! Every call to [`encrypt`] draws a fresh salt and nonce, derives a 256-bit
//! key from the PIN, and seals the JSON form of the value with AES-256-GCM.
//! The framing is documented in [`super::blob`].
//!
//! [`hash_pin`] is a separate, fast digest used only for the unlock check.
//! It is never used as key material.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::blob::{self, BlobParts, NONCE_LEN, SALT_LEN};
use super::error::{VaultError, VaultResult};

/// PBKDF2-HMAC-SHA256 rounds. Shared with the browser wallet; changing it
/// breaks every existing version-1 and legacy blob.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Argon2id parameters for version-2 blobs:
/// - Memory: 64 MB
/// - Time: 3 iterations
/// - Parallelism: 4 lanes
const ARGON2_MEMORY_COST: u32 = 65536; // 64 MB in KiB
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_PARALLELISM: u32 = 4;

const KEY_LEN: usize = 32; // 256-bit key for AES-256

/// Key derivation function used for a blob, identified by its version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KdfScheme {
    /// PBKDF2-HMAC-SHA256, 100k rounds. Readable by the browser wallet.
    #[default]
    Pbkdf2Sha256,
    /// Argon2id, 64 MiB / 3 passes / 4 lanes.
    Argon2id,
}

impl KdfScheme {
    pub fn version_byte(self) -> u8 {
        match self {
            KdfScheme::Pbkdf2Sha256 => 0x01,
            KdfScheme::Argon2id => 0x02,
        }
    }

    pub fn from_version_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(KdfScheme::Pbkdf2Sha256),
            0x02 => Some(KdfScheme::Argon2id),
            _ => None,
        }
    }
}

/// A 256-bit encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    key: [u8; KEY_LEN],
}

impl VaultKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the actual key material
        f.debug_struct("VaultKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the AES key for a PIN with PBKDF2-HMAC-SHA256.
///
/// Deterministic for a given `(pin, salt)`; the salt is regenerated on every
/// encryption so equal PINs never share a key across blobs.
pub fn derive_key(pin: &str, salt: &[u8; SALT_LEN]) -> VaultKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    VaultKey { key }
}

/// Derive the AES key for a PIN with the given scheme.
pub fn derive_key_with(scheme: KdfScheme, pin: &str, salt: &[u8; SALT_LEN]) -> VaultResult<VaultKey> {
    match scheme {
        KdfScheme::Pbkdf2Sha256 => Ok(derive_key(pin, salt)),
        KdfScheme::Argon2id => {
            let params = Params::new(
                ARGON2_MEMORY_COST,
                ARGON2_TIME_COST,
                ARGON2_PARALLELISM,
                Some(KEY_LEN),
            )
            .map_err(|e| VaultError::KeyDerivation(format!("Invalid Argon2 params: {}", e)))?;

            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            let mut key = [0u8; KEY_LEN];
            argon2
                .hash_password_into(pin.as_bytes(), salt, &mut key)
                .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
            Ok(VaultKey { key })
        }
    }
}

/// Encrypt `data` under `pin` with the default scheme (PBKDF2).
pub fn encrypt<T: Serialize + ?Sized>(data: &T, pin: &str) -> VaultResult<String> {
    encrypt_with(KdfScheme::default(), data, pin)
}

/// Encrypt `data` under `pin`, framing it for `scheme`.
pub fn encrypt_with<T: Serialize + ?Sized>(
    scheme: KdfScheme,
    data: &T,
    pin: &str,
) -> VaultResult<String> {
    let plaintext = Zeroizing::new(serde_json::to_vec(data)?);

    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    let mut rng = rand::rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key_with(scheme, pin, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("Invalid key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))?;

    debug!(
        "Sealed {} plaintext bytes (scheme {:?})",
        plaintext.len(),
        scheme
    );
    Ok(blob::frame(scheme, &salt, &nonce_bytes, &ciphertext))
}

/// Decrypt a blob produced by [`encrypt`] (or by the legacy browser format).
///
/// Fails with [`VaultError::InvalidCredentialOrCorruptData`] for a wrong PIN,
/// a tampered or truncated blob, or undecodable contents alike.
pub fn decrypt<T: DeserializeOwned>(encoded: &str, pin: &str) -> VaultResult<T> {
    let bytes = blob::decode(encoded)?;

    for parts in blob::candidates(&bytes) {
        if let Some(plaintext) = open_parts(&parts, pin) {
            return serde_json::from_slice(&plaintext)
                .map_err(|_| VaultError::InvalidCredentialOrCorruptData);
        }
    }

    Err(VaultError::InvalidCredentialOrCorruptData)
}

fn open_parts(parts: &BlobParts<'_>, pin: &str) -> Option<Zeroizing<Vec<u8>>> {
    let key = derive_key_with(parts.scheme, pin, parts.salt).ok()?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).ok()?;
    cipher
        .decrypt(Nonce::from_slice(parts.nonce), parts.ciphertext)
        .ok()
        .map(Zeroizing::new)
}

/// One-way digest of the PIN for the fast unlock check: `base64(SHA-256(pin))`.
pub fn hash_pin(pin: &str) -> String {
    STANDARD.encode(Sha256::digest(pin.as_bytes()))
}

/// Compare a PIN against a stored [`hash_pin`] digest in constant time.
pub fn verify_pin(pin: &str, expected_hash: &str) -> bool {
    hash_pin(pin)
        .as_bytes()
        .ct_eq(expected_hash.as_bytes())
        .into()
}

/// [`encrypt_with`] on the blocking pool, so the KDF does not stall other tasks.
pub async fn seal<T>(scheme: KdfScheme, data: T, pin: Zeroizing<String>) -> VaultResult<String>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || encrypt_with(scheme, &data, &pin))
        .await
        .map_err(|e| VaultError::Encryption(format!("Cipher task failed: {}", e)))?
}

/// [`decrypt`] on the blocking pool.
pub async fn open<T>(encoded: String, pin: Zeroizing<String>) -> VaultResult<T>
where
    T: DeserializeOwned + Send + 'static,
{
    tokio::task::spawn_blocking(move || decrypt(&encoded, &pin))
        .await
        .map_err(|e| VaultError::Encryption(format!("Cipher task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::vault::blob::{LEGACY_MIN_LEN, TAG_LEN, VERSIONED_MIN_LEN};

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [1u8; 16];
        let key1 = derive_key("1234", &salt);
        let key2 = derive_key("1234", &salt);

        assert_eq!(key1.as_bytes(), key2.as_bytes());
        assert_eq!(key1.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn test_derive_key_different_salts() {
        let key1 = derive_key("1234", &[1u8; 16]);
        let key2 = derive_key("1234", &[2u8; 16]);
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_pins() {
        let salt = [1u8; 16];
        assert_ne!(
            derive_key("1234", &salt).as_bytes(),
            derive_key("5678", &salt).as_bytes()
        );
    }

    #[test]
    fn test_encrypt_decrypt_pin_hash_record() {
        let data = json!({ "pinHash": "abc" });
        let blob = encrypt(&data, "1234").unwrap();
        assert!(blob.len() >= 40);

        let decrypted: Value = decrypt(&blob, "1234").unwrap();
        assert_eq!(decrypted, data);

        let wrong = decrypt::<Value>(&blob, "0000");
        assert!(matches!(wrong, Err(VaultError::InvalidCredentialOrCorruptData)));
    }

    #[test]
    fn test_round_trip_structured_values() {
        let data = json!({
            "wallets": [{ "id": "1", "mnemonic": "abandon ability able", "balance": 1.5 }],
            "activeWalletIndex": 0,
            "isTestnet": true,
        });
        let blob = encrypt(&data, "246810").unwrap();
        assert_eq!(decrypt::<Value>(&blob, "246810").unwrap(), data);

        let text = "plain string with ünïcode";
        let blob = encrypt(text, "").unwrap();
        assert_eq!(decrypt::<String>(&blob, "").unwrap(), text);
    }

    #[test]
    fn test_encrypt_is_not_deterministic() {
        let data = json!({ "a": 1 });
        let a = encrypt(&data, "1234").unwrap();
        let b = encrypt(&data, "1234").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_versioned_frame_layout() {
        let blob = encrypt(&json!(null), "1234").unwrap();
        let bytes = STANDARD.decode(&blob).unwrap();
        assert_eq!(bytes[0], KdfScheme::Pbkdf2Sha256.version_byte());
        // "null" is 4 plaintext bytes
        assert_eq!(bytes.len(), VERSIONED_MIN_LEN + 4);
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() {
        let blob = encrypt(&json!({ "secret": "abandon" }), "1234").unwrap();
        let bytes = STANDARD.decode(&blob).unwrap();

        let ciphertext_start = 1 + SALT_LEN + NONCE_LEN;
        for index in [ciphertext_start, bytes.len() - TAG_LEN, bytes.len() - 1] {
            let mut tampered = bytes.clone();
            tampered[index] ^= 0x01;
            let result = decrypt::<Value>(&STANDARD.encode(&tampered), "1234");
            assert!(
                matches!(result, Err(VaultError::InvalidCredentialOrCorruptData)),
                "flip at {} was not detected",
                index
            );
        }
    }

    #[test]
    fn test_malformed_blobs_fail_cleanly() {
        let truncated = STANDARD.encode([0u8; LEGACY_MIN_LEN - 1]);
        for input in ["", "====", "not base64!", truncated.as_str()] {
            assert!(matches!(
                decrypt::<Value>(input, "1234"),
                Err(VaultError::InvalidCredentialOrCorruptData)
            ));
        }
    }

    #[test]
    fn test_legacy_frame_still_decrypts() {
        let salt = [0x01u8; SALT_LEN]; // leading byte collides with the version tag
        let nonce = [9u8; NONCE_LEN];
        let key = derive_key("1234", &salt);
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).unwrap();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), br#"{"pinHash":"abc"}"#.as_slice())
            .unwrap();

        let mut legacy = salt.to_vec();
        legacy.extend_from_slice(&nonce);
        legacy.extend_from_slice(&ciphertext);

        let decrypted: Value = decrypt(&STANDARD.encode(&legacy), "1234").unwrap();
        assert_eq!(decrypted, json!({ "pinHash": "abc" }));
    }

    #[test]
    fn test_argon2id_round_trip() {
        let data = json!({ "mnemonic": "abandon ability able" });
        let blob = encrypt_with(KdfScheme::Argon2id, &data, "1234").unwrap();
        assert_eq!(STANDARD.decode(&blob).unwrap()[0], 0x02);
        assert_eq!(decrypt::<Value>(&blob, "1234").unwrap(), data);
        assert!(decrypt::<Value>(&blob, "4321").is_err());
    }

    #[test]
    fn test_hash_pin() {
        assert_eq!(hash_pin("1234"), hash_pin("1234"));
        assert_ne!(hash_pin("1234"), hash_pin("1235"));
        // base64 of a 32-byte digest
        assert_eq!(hash_pin("1234").len(), 44);
        assert_ne!(hash_pin("1234"), "1234");
    }

    #[test]
    fn test_verify_pin() {
        let stored = hash_pin("1234");
        assert!(verify_pin("1234", &stored));
        assert!(!verify_pin("1235", &stored));
        assert!(!verify_pin("1234", ""));
    }

    #[test]
    fn test_vault_key_debug_is_redacted() {
        let key = derive_key("1234", &[0u8; 16]);
        assert!(format!("{:?}", key).contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_seal_and_open_on_blocking_pool() {
        let pin = || Zeroizing::new("1234".to_string());
        let blob = seal(KdfScheme::Pbkdf2Sha256, json!({ "k": "v" }), pin())
            .await
            .unwrap();
        let value: Value = open(blob.clone(), pin()).await.unwrap();
        assert_eq!(value, json!({ "k": "v" }));

        let err = open::<Value>(blob, Zeroizing::new("9999".into())).await;
        assert!(matches!(err, Err(VaultError::InvalidCredentialOrCorruptData)));
    }
}
