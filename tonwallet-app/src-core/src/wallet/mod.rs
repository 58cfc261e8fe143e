mod models;
mod store;

pub use models::{JettonBalance, WalletRecord, WalletsSnapshot};
pub use store::WalletVault;
