//! Nonblocking Solana RPC implementation of [`ChainRpc`]

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::time::Duration;
use tracing::debug;

use super::{ChainRpc, TransactionDetail};
use crate::error::{Error, Result};

/// Chain RPC backed by `solana_client`
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    /// Connect to `endpoint` with `confirmed` commitment
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                endpoint,
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        debug!("Fetching balance for {}", address);
        self.client
            .get_balance(address)
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Failed to get balance: {}", e)))
    }

    async fn get_latest_checkpoint(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Failed to get blockhash: {}", e)))
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<String>> {
        debug!("Fetching up to {} signatures for {}", limit, address);
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
            ..Default::default()
        };

        let statuses = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Failed to get signatures: {}", e)))?;

        Ok(statuses.into_iter().map(|s| s.signature).collect())
    }

    async fn get_transaction_detail(&self, signature: &str) -> Result<Option<TransactionDetail>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        // Raw request so an unknown signature comes back as `null` instead of a decode error
        let tx: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .client
            .send(
                RpcRequest::GetTransaction,
                serde_json::json!([signature, config]),
            )
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Failed to get transaction: {}", e)))?;

        Ok(tx.map(|tx| TransactionDetail {
            slot: tx.slot,
            block_time: tx.block_time,
            fee: tx.transaction.meta.map(|meta| meta.fee),
        }))
    }
}
