//! Domain value objects shared by the ledger adapter and its collaborators

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Base units (lamports) per display unit (SOL)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert SOL to lamports, rounded to the nearest base unit
///
/// `None` when the result is not finite, negative, or does not fit in a `u64`.
pub fn sol_to_lamports(sol: f64) -> Option<u64> {
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if !lamports.is_finite() || lamports < 0.0 || lamports >= u64::MAX as f64 {
        return None;
    }
    Some(lamports as u64)
}

/// A syntactically valid on-chain account key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletAddress(Pubkey);

impl WalletAddress {
    /// Parse a base58 account key
    pub fn parse(address: &str) -> Result<Self> {
        Pubkey::from_str(address.trim())
            .map(Self)
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))
    }

    pub fn pubkey(&self) -> &Pubkey {
        &self.0
    }
}

impl From<Pubkey> for WalletAddress {
    fn from(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }
}

impl FromStr for WalletAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One asset owned by a wallet, as reported by the indexer
///
/// `amount` is taken as-is from the indexer; token balances are not
/// rescaled by their decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHolding {
    pub asset_id: String,
    /// `None` when the indexer returned no balance metadata for the asset
    pub amount: Option<f64>,
}

/// A proposed wager to check against current holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetValidationRequest {
    pub wallet: String,
    pub amount: f64,
}

/// A proposed movement of the governing asset between two wallets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// The asset bets are settled in, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoverningAsset {
    /// Native currency (SOL)
    #[default]
    Native,
    /// Custom fungible token, identified by its mint
    Token(String),
}

impl GoverningAsset {
    pub fn from_token_mint(mint: Option<&str>) -> Self {
        match mint.map(str::trim) {
            Some(m) if !m.is_empty() => GoverningAsset::Token(m.to_string()),
            _ => GoverningAsset::Native,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, GoverningAsset::Native)
    }
}

impl fmt::Display for GoverningAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoverningAsset::Native => write!(f, "SOL"),
            GoverningAsset::Token(mint) => write!(f, "token {}", mint),
        }
    }
}

/// Read-only projection of a historical on-chain transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: u64,
    /// Unix timestamp, when the cluster reported one
    pub block_time: Option<i64>,
    /// Fee in lamports
    pub fee: u64,
}

/// Handle for a push subscription registered with the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchHandle {
    pub id: String,
    pub url: String,
    pub addresses: Vec<String>,
}

/// Wallet overview for the game UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub wallet: String,
    pub native_balance: f64,
    pub governing_asset: GoverningAsset,
    pub governing_balance: f64,
    pub recent_transactions: Vec<TransactionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sol_lamports_conversion() {
        assert_eq!(sol_to_lamports(1.0), Some(1_000_000_000));
        assert_eq!(sol_to_lamports(0.5), Some(500_000_000));
        assert_eq!(sol_to_lamports(0.001), Some(1_000_000));
        // 2.3 * 1e9 is 2299999999.9999995 in f64
        assert_eq!(sol_to_lamports(2.3), Some(2_300_000_000));
        assert_eq!(sol_to_lamports(1e-12), Some(0));

        assert_eq!(sol_to_lamports(1e11), None);
        assert_eq!(sol_to_lamports(-1.0), None);
        assert_eq!(sol_to_lamports(f64::NAN), None);
        assert_eq!(sol_to_lamports(f64::INFINITY), None);

        assert_eq!(lamports_to_sol(1_000_000_000), 1.0);
        assert_eq!(lamports_to_sol(2_500_000_000), 2.5);
        assert_eq!(lamports_to_sol(1_000_000), 0.001);
    }

    #[test]
    fn test_wallet_address_parse() {
        let key = Pubkey::new_unique();
        let parsed = WalletAddress::parse(&key.to_string()).unwrap();
        assert_eq!(parsed.pubkey(), &key);
        assert_eq!(parsed.to_string(), key.to_string());
    }

    #[test]
    fn test_wallet_address_rejects_garbage() {
        for bad in ["", "not-a-wallet", "0OIl", "abc"] {
            let err = WalletAddress::parse(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidAddress(_)), "{bad}");
        }
    }

    #[test]
    fn test_governing_asset_from_mint() {
        assert_eq!(GoverningAsset::from_token_mint(None), GoverningAsset::Native);
        assert_eq!(GoverningAsset::from_token_mint(Some("  ")), GoverningAsset::Native);
        assert_eq!(
            GoverningAsset::from_token_mint(Some("Mint111")),
            GoverningAsset::Token("Mint111".into())
        );
        assert!(GoverningAsset::default().is_native());
    }
}
