//! Biometric unlock coordination.
//!
//! Bridges the platform authenticator to the unlock flow. The PIN never
//! passes through here: a successful assertion only proves the user is
//! present, it does not yield key material.

use std::sync::Arc;
use std::time::Duration;

use tonwallet_authn::{
    random_base64url, AssertionRequest, CredentialCreationOptions, PlatformAuthenticator,
    PubKeyCredParam, RelyingParty, UserEntity, UserVerification, COSE_ALG_ES256, COSE_ALG_RS256,
};
use tracing::{debug, info, warn};

use super::error::{VaultError, VaultResult};

const USER_DISPLAY_NAME: &str = "TON Wallet User";

pub struct BiometricCoordinator {
    authenticator: Arc<dyn PlatformAuthenticator>,
    relying_party: RelyingParty,
    timeout: Duration,
}

impl BiometricCoordinator {
    pub fn new(
        authenticator: Arc<dyn PlatformAuthenticator>,
        relying_party: RelyingParty,
        timeout: Duration,
    ) -> Self {
        Self {
            authenticator,
            relying_party,
            timeout,
        }
    }

    /// Whether a user-verifying platform authenticator is present.
    pub async fn is_available(&self) -> bool {
        self.authenticator.check_availability().await.available
    }

    /// Create a platform credential for `username` and return its id.
    pub async fn register_biometric(&self, username: &str) -> VaultResult<String> {
        let status = self.authenticator.check_availability().await;
        if !status.available {
            let reason = status
                .unavailable_reason
                .unwrap_or_else(|| "no platform authenticator".to_string());
            warn!("Biometric registration unavailable: {}", reason);
            return Err(VaultError::BiometricUnavailable(reason));
        }

        let options = CredentialCreationOptions {
            challenge: random_base64url::<32>(),
            rp: self.relying_party.clone(),
            user: UserEntity {
                id: random_base64url::<32>(),
                name: username.to_string(),
                display_name: USER_DISPLAY_NAME.to_string(),
            },
            pub_key_cred_params: vec![
                PubKeyCredParam {
                    alg: COSE_ALG_ES256,
                },
                PubKeyCredParam {
                    alg: COSE_ALG_RS256,
                },
            ],
            timeout_ms: self.timeout_ms(),
            user_verification: UserVerification::Required,
            require_resident_key: false,
        };

        let credential =
            match tokio::time::timeout(self.timeout, self.authenticator.create_credential(options))
                .await
            {
                Ok(Ok(credential)) => credential,
                Ok(Err(tonwallet_authn::Error::NotAvailable(reason))) => {
                    warn!("Platform authenticator went away: {}", reason);
                    return Err(VaultError::BiometricUnavailable(reason));
                }
                Ok(Err(e)) => {
                    warn!("Biometric registration failed: {}", e);
                    return Err(VaultError::RegistrationFailed(e.to_string()));
                }
                Err(_) => {
                    warn!("Biometric registration timed out after {:?}", self.timeout);
                    return Err(VaultError::RegistrationFailed(
                        tonwallet_authn::Error::Timeout.to_string(),
                    ));
                }
            };

        if credential.credential_id.is_empty() {
            return Err(VaultError::RegistrationFailed(
                "platform returned an empty credential id".into(),
            ));
        }

        info!("Biometric credential registered for {}", username);
        Ok(credential.credential_id)
    }

    /// Assert `credential_id` against a fresh challenge.
    ///
    /// Returns `Ok(false)` for every expected failure (cancel, mismatch,
    /// timeout). Only a missing credential id is an error.
    pub async fn authenticate_with_biometric(&self, credential_id: &str) -> VaultResult<bool> {
        if credential_id.is_empty() {
            return Err(VaultError::MissingCredential);
        }

        let challenge = random_base64url::<32>();
        let request = AssertionRequest {
            challenge: challenge.clone(),
            rp_id: self.relying_party.id.clone(),
            allow_credentials: vec![credential_id.to_string()],
            user_verification: UserVerification::Required,
            timeout_ms: self.timeout_ms(),
        };

        let assertion =
            match tokio::time::timeout(self.timeout, self.authenticator.get_assertion(request))
                .await
            {
                Ok(Ok(assertion)) => assertion,
                Ok(Err(e)) => {
                    warn!("Biometric authentication failed: {}", e);
                    return Ok(false);
                }
                Err(_) => {
                    warn!("Biometric authentication timed out after {:?}", self.timeout);
                    return Ok(false);
                }
            };

        if assertion.credential_id != credential_id {
            warn!("Assertion names a different credential");
            return Ok(false);
        }
        if assertion.challenge != challenge {
            warn!("Assertion does not answer the issued challenge");
            return Ok(false);
        }
        if !assertion.user_verified {
            warn!("Assertion lacks user verification");
            return Ok(false);
        }

        debug!("Biometric assertion verified");
        Ok(true)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
