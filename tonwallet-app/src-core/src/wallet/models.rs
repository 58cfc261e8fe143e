use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A jetton (TON fungible token) held by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JettonBalance {
    pub name: String,
    pub symbol: String,
    pub master_address: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Recovery phrase. Only ever persisted inside an encrypted blob.
    pub mnemonic: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub jettons: Vec<JettonBalance>,
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("mnemonic", &"[REDACTED]")
            .field("balance", &self.balance)
            .field("jettons", &self.jettons)
            .finish()
    }
}

impl Zeroize for WalletRecord {
    fn zeroize(&mut self) {
        self.mnemonic.zeroize();
    }
}

impl Drop for WalletRecord {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Everything stored under the `wallets` key. Persisted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletsSnapshot {
    pub wallets: Vec<WalletRecord>,
    pub active_wallet_index: usize,
    pub is_testnet: bool,
}

impl Default for WalletsSnapshot {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            active_wallet_index: 0,
            is_testnet: true,
        }
    }
}

impl WalletsSnapshot {
    pub fn active_wallet(&self) -> Option<&WalletRecord> {
        self.wallets.get(self.active_wallet_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = WalletsSnapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "wallets": [], "activeWalletIndex": 0, "isTestnet": true })
        );
    }

    #[test]
    fn test_snapshot_missing_fields_default() {
        let snapshot: WalletsSnapshot = serde_json::from_str(r#"{ "wallets": [] }"#).unwrap();
        assert_eq!(snapshot.active_wallet_index, 0);
        assert!(snapshot.is_testnet);
        assert!(snapshot.active_wallet().is_none());
    }

    #[test]
    fn test_wallet_debug_hides_mnemonic() {
        let wallet = WalletRecord {
            id: "1".into(),
            name: "Wallet 1".into(),
            address: "EQabc".into(),
            mnemonic: "abandon ability able".into(),
            balance: 0.0,
            jettons: Vec::new(),
        };
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_wallet_zeroize_clears_mnemonic_only() {
        let mut wallet = WalletRecord {
            id: "1".into(),
            name: "Wallet 1".into(),
            address: "EQabc".into(),
            mnemonic: "abandon ability able".into(),
            balance: 2.0,
            jettons: Vec::new(),
        };
        wallet.zeroize();
        assert!(wallet.mnemonic.is_empty());
        assert_eq!(wallet.name, "Wallet 1");
        assert_eq!(wallet.balance, 2.0);
    }
}
