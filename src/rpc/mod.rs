//! Chain RPC access
//!
//! [`ChainRpc`] is the seam the ledger adapter talks to; [`SolanaRpc`]
//! backs it with the nonblocking Solana RPC client.

mod solana;

pub use solana::SolanaRpc;

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey};

use crate::error::Result;

/// Transaction detail needed for a history record
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetail {
    pub slot: u64,
    pub block_time: Option<i64>,
    /// `None` when the cluster returned no status metadata
    pub fee: Option<u64>,
}

/// Minimal chain RPC surface used by the ledger
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Balance in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// Latest blockhash, used as a transaction's validity anchor
    async fn get_latest_checkpoint(&self) -> Result<Hash>;

    /// Most recent signatures for `address`, newest first
    async fn get_signatures_for_address(&self, address: &Pubkey, limit: usize)
        -> Result<Vec<String>>;

    /// Full detail for one signature, `None` if the cluster has no record of it
    async fn get_transaction_detail(&self, signature: &str) -> Result<Option<TransactionDetail>>;
}
