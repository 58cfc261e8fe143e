//! Local secret vault.
//!
//! This module provides:
//! - PIN-derived encryption of wallet secrets (PBKDF2-SHA256 or Argon2id
//!   into AES-256-GCM)
//! - A persistent key-value store of encrypted blobs
//! - PIN and biometric unlock on top of that store
//!
//! The PIN is never stored. Unlock compares a one-way digest; secrets are
//! decrypted with a key re-derived from the PIN and a per-blob salt.

pub mod auth;
pub mod backend;
pub mod biometric;
pub mod blob;
pub mod cipher;
pub mod error;
pub mod manager;
pub mod store;

pub use auth::{AuthRecord, AuthStatus, AuthSummary};
pub use backend::{FileBackend, KvBackend, MemoryBackend, StoreLocation};
pub use biometric::BiometricCoordinator;
pub use cipher::{decrypt, derive_key, encrypt, encrypt_with, hash_pin, verify_pin, KdfScheme, VaultKey};
pub use error::{VaultError, VaultResult};
pub use manager::AuthManager;
pub use store::{KeyGuard, SecretStore, AUTH_KEY, WALLETS_KEY};
