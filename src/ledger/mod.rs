//! Wallet ledger: balances, bet eligibility and unsigned transfer assembly
//!
//! # Architecture
//!
//! ```text
//! game server → WalletLedgerAdapter → ChainRpc     (Solana RPC)
//!                                   → AssetIndexer (Helius DAS + webhooks)
//! ```
//!
//! The governing asset (native SOL or a custom token mint) is fixed at
//! construction and decides which balance backs every bet check.

pub mod adapter;
pub mod types;

pub use adapter::{LedgerSettings, WalletLedgerAdapter, HOLDINGS_PAGE, HOLDINGS_PAGE_SIZE};
pub use types::{
    lamports_to_sol, sol_to_lamports, AssetHolding, BetValidationRequest, GoverningAsset,
    TransactionRecord, TransferIntent, WalletAddress, WalletSummary, WatchHandle,
    LAMPORTS_PER_SOL,
};
