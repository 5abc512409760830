//! Wager Ledger Library
//!
//! Wallet balance queries, bet eligibility and unsigned transfer assembly
//! for games settling in SOL or a custom Solana token.

pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod ledger;
pub mod rpc;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::{GoverningAsset, WalletLedgerAdapter};
