//! Data types exchanged with the platform authenticator.

use serde::{Deserialize, Serialize};

/// COSE algorithm identifier for ECDSA P-256 / SHA-256.
pub const COSE_ALG_ES256: i32 = -7;
/// COSE algorithm identifier for RSASSA-PKCS1-v1_5 / SHA-256.
pub const COSE_ALG_RS256: i32 = -257;

/// The mechanism backing the platform authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticatorMethod {
    /// In-process authenticator (headless hosts, development builds).
    Software,
    /// macOS Keychain.
    MacOSKeychain,
    /// Windows Credential Manager.
    WindowsCredentialManager,
    /// Linux Secret Service API (GNOME Keyring, KWallet, etc.)
    LinuxSecretService,
}

/// Whether a user-verifying platform authenticator can be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorStatus {
    pub available: bool,
    pub method: Option<AuthenticatorMethod>,
    pub unavailable_reason: Option<String>,
}

impl AuthenticatorStatus {
    pub fn available(method: AuthenticatorMethod) -> Self {
        Self {
            available: true,
            method: Some(method),
            unavailable_reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            method: None,
            unavailable_reason: Some(reason.into()),
        }
    }
}

/// Relying party the credential is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelyingParty {
    pub id: String,
    pub name: String,
}

/// Account the credential is created for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// Random user handle, base64url without padding.
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubKeyCredParam {
    pub alg: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

/// Options for creating a new platform credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreationOptions {
    /// Random challenge, base64url without padding.
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout_ms: u64,
    pub user_verification: UserVerification,
    pub require_resident_key: bool,
}

/// Options for asserting an existing credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionRequest {
    /// Random challenge, base64url without padding.
    pub challenge: String,
    pub rp_id: String,
    pub allow_credentials: Vec<String>,
    pub user_verification: UserVerification,
    pub timeout_ms: u64,
}

/// Result of a successful credential creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCredential {
    pub credential_id: String,
    /// Public key material (base64url), empty when the platform withholds it.
    pub public_key: String,
}

/// Result of a completed assertion ceremony.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    pub credential_id: String,
    /// Challenge the authenticator signed over, echoed back.
    pub challenge: String,
    pub user_verified: bool,
}
