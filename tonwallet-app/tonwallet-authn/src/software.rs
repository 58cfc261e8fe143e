//! In-process authenticator.
//!
//! Used on hosts without a platform authenticator (headless builds, CI) and
//! wherever the user-presence outcome has to be scripted. Credentials live
//! only for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::*;
use crate::{random_base64url, PlatformAuthenticator};

/// How the simulated user reacts to the next prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserResponse {
    /// Verify successfully.
    #[default]
    Approve,
    /// Dismiss the prompt.
    Cancel,
    /// Present the wrong biometric.
    Reject,
    /// Never answer; the caller's timeout decides.
    Stall,
}

struct SoftwareCredential {
    rp_id: String,
    user_handle: String,
}

pub struct SoftwareAuthenticator {
    available: bool,
    response: RwLock<UserResponse>,
    credentials: RwLock<HashMap<String, SoftwareCredential>>,
}

impl SoftwareAuthenticator {
    pub fn new() -> Self {
        Self {
            available: true,
            response: RwLock::new(UserResponse::Approve),
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// An authenticator that reports no platform support.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub async fn set_response(&self, response: UserResponse) {
        *self.response.write().await = response;
    }

    pub async fn credential_count(&self) -> usize {
        self.credentials.read().await.len()
    }

    async fn prompt_user(&self) -> Result<()> {
        if !self.available {
            return Err(Error::NotAvailable("software authenticator disabled".into()));
        }
        let response = *self.response.read().await;
        match response {
            UserResponse::Approve => Ok(()),
            UserResponse::Cancel => Err(Error::UserCancelled),
            UserResponse::Reject => Err(Error::AuthenticationFailed(
                "user verification failed".into(),
            )),
            UserResponse::Stall => std::future::pending().await,
        }
    }
}

impl Default for SoftwareAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformAuthenticator for SoftwareAuthenticator {
    async fn check_availability(&self) -> AuthenticatorStatus {
        if self.available {
            AuthenticatorStatus::available(AuthenticatorMethod::Software)
        } else {
            AuthenticatorStatus::unavailable("software authenticator disabled")
        }
    }

    async fn create_credential(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<RegisteredCredential> {
        self.prompt_user().await?;

        let credential_id = random_base64url::<16>();

        self.credentials.write().await.insert(
            credential_id.clone(),
            SoftwareCredential {
                rp_id: options.rp.id.clone(),
                user_handle: options.user.id.clone(),
            },
        );

        info!(
            "Registered software credential for rp {} (user {})",
            options.rp.id, options.user.name
        );
        // No attestation and no key material leaves a software authenticator.
        Ok(RegisteredCredential {
            credential_id,
            public_key: String::new(),
        })
    }

    async fn get_assertion(&self, request: AssertionRequest) -> Result<Assertion> {
        let credential_id = {
            let credentials = self.credentials.read().await;
            request
                .allow_credentials
                .iter()
                .find(|id| {
                    credentials
                        .get(id.as_str())
                        .is_some_and(|c| c.rp_id == request.rp_id)
                })
                .cloned()
                .ok_or(Error::CredentialNotFound)?
        };

        self.prompt_user().await?;

        if let Some(credential) = self.credentials.read().await.get(&credential_id) {
            debug!("Asserting credential for user handle {}", credential.user_handle);
        }

        Ok(Assertion {
            credential_id,
            challenge: request.challenge,
            user_verified: true,
        })
    }
}
