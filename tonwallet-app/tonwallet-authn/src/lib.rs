//! Bridge to a WebAuthn-class platform authenticator.
//!
//! The wallet never hands the PIN to this crate. It only asks the platform to
//! create a user-verifying credential and later to assert it against a fresh
//! challenge.

use async_trait::async_trait;
use base64::Engine;
use rand::RngCore;

pub use models::*;

#[cfg(all(
    feature = "os-keyring",
    any(target_os = "macos", target_os = "windows", target_os = "linux")
))]
mod desktop;
mod error;
mod models;
mod software;

pub use error::{Error, Result};
pub use software::{SoftwareAuthenticator, UserResponse};

#[cfg(all(
    feature = "os-keyring",
    any(target_os = "macos", target_os = "windows", target_os = "linux")
))]
pub use desktop::KeyringAuthenticator;

/// A platform credential API (WebAuthn `navigator.credentials` equivalent).
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Report whether a user-verifying authenticator can be used right now.
    async fn check_availability(&self) -> AuthenticatorStatus;

    /// Run the registration ceremony and return the new credential.
    async fn create_credential(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<RegisteredCredential>;

    /// Run the assertion ceremony against one of `request.allow_credentials`.
    async fn get_assertion(&self, request: AssertionRequest) -> Result<Assertion>;
}

/// Generate `N` random bytes encoded as base64url without padding.
pub fn random_base64url<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    encode_base64url(&bytes)
}

pub fn encode_base64url(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
