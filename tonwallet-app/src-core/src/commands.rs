//! Command boundary for the UI shell.
//!
//! Every function here catches its error, logs it, and hands back a
//! [`CommandResponse`] instead of a `Result`.

use std::future::Future;

use serde::Serialize;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::vault::{AuthSummary, VaultError, VaultResult};
use crate::wallet::{JettonBalance, WalletRecord, WalletsSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

fn respond<T>(command: &str, result: Result<T>) -> CommandResponse<T> {
    match result {
        Ok(data) => CommandResponse::ok(data),
        Err(e) => {
            error!("{} failed: {}", command, e);
            CommandResponse::err(e.user_message())
        }
    }
}

/// Run `op` only while the session is unlocked.
async fn when_unlocked<T>(
    state: &AppState,
    op: impl Future<Output = VaultResult<T>>,
) -> Result<T> {
    if !state.auth.is_unlocked().await {
        return Err(AppError::Vault(VaultError::Locked));
    }
    Ok(op.await?)
}

// ============================================================================
// Auth
// ============================================================================

pub async fn get_auth_status(state: &AppState) -> CommandResponse<AuthSummary> {
    respond("get_auth_status", state.auth.summary().await.map_err(Into::into))
}

pub async fn is_biometric_available(state: &AppState) -> CommandResponse<bool> {
    CommandResponse::ok(state.auth.biometric().is_available().await)
}

pub async fn setup_pin(state: &AppState, pin: String) -> CommandResponse<()> {
    respond("setup_pin", state.auth.setup_pin(&pin).await.map_err(Into::into))
}

pub async fn unlock_with_pin(state: &AppState, pin: String) -> CommandResponse<()> {
    respond(
        "unlock_with_pin",
        state.auth.unlock_with_pin(&pin).await.map_err(Into::into),
    )
}

/// `data` is `false` when the user declined or the assertion failed.
pub async fn unlock_with_biometric(state: &AppState) -> CommandResponse<bool> {
    respond(
        "unlock_with_biometric",
        state.auth.unlock_with_biometric().await.map_err(Into::into),
    )
}

/// Register a platform credential and link it; returns the credential id.
pub async fn enable_biometric(state: &AppState, username: String) -> CommandResponse<String> {
    respond(
        "enable_biometric",
        when_unlocked(state, state.auth.enable_biometric(&username)).await,
    )
}

pub async fn link_biometric(state: &AppState, credential_id: String) -> CommandResponse<()> {
    respond(
        "link_biometric",
        when_unlocked(state, state.auth.link_biometric(&credential_id)).await,
    )
}

pub async fn lock(state: &AppState) -> CommandResponse<()> {
    state.auth.lock().await;
    CommandResponse::ok(())
}

/// Wipe the vault. All wallets are lost.
pub async fn reset(state: &AppState) -> CommandResponse<()> {
    info!("Vault reset requested");
    respond("reset", state.auth.reset().await.map_err(Into::into))
}

// ============================================================================
// Wallets
// ============================================================================

pub async fn load_wallets(state: &AppState, pin: String) -> CommandResponse<WalletsSnapshot> {
    respond(
        "load_wallets",
        when_unlocked(state, state.wallets.load(&pin)).await,
    )
}

pub async fn add_wallet(
    state: &AppState,
    pin: String,
    name: String,
    address: String,
    mnemonic: String,
) -> CommandResponse<WalletRecord> {
    respond(
        "add_wallet",
        when_unlocked(state, state.wallets.add_wallet(&pin, &name, &address, &mnemonic)).await,
    )
}

pub async fn set_active_wallet(state: &AppState, pin: String, index: usize) -> CommandResponse<()> {
    respond(
        "set_active_wallet",
        when_unlocked(state, state.wallets.set_active(&pin, index)).await,
    )
}

/// Returns the new `is_testnet` value.
pub async fn toggle_network(state: &AppState, pin: String) -> CommandResponse<bool> {
    respond(
        "toggle_network",
        when_unlocked(state, state.wallets.toggle_network(&pin)).await,
    )
}

pub async fn update_balances(
    state: &AppState,
    pin: String,
    index: usize,
    balance: f64,
    jettons: Vec<JettonBalance>,
) -> CommandResponse<()> {
    respond(
        "update_balances",
        when_unlocked(state, state.wallets.update_balances(&pin, index, balance, jettons)).await,
    )
}
