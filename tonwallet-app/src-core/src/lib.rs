pub mod commands;
pub mod error;
pub mod state;
pub mod storage;
pub mod vault;
pub mod wallet;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use commands::CommandResponse;
pub use error::{AppError, Result};
pub use state::AppState;
pub use storage::{load_settings, save_settings, AppSettings};
pub use vault::{AuthStatus, AuthSummary, KdfScheme, VaultError};
pub use wallet::{JettonBalance, WalletRecord, WalletsSnapshot};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tonwallet_app=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
