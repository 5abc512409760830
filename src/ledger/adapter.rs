//! Wallet ledger adapter
//!
//! Answers game-side questions ("can this wallet bet X?", "move X from A
//! to B") against the injected chain RPC and indexer.
//!
//! Two failure policies coexist:
//! - primitives (`get_native_balance`, `build_transfer`, watch management)
//!   propagate typed errors
//! - aggregates (`get_asset_balance`, `can_cover_bet`,
//!   `get_transaction_history`) log and fall back to `0`, `false` or empty

use futures::stream::{self, StreamExt, TryStreamExt};
use solana_sdk::{message::Message, system_instruction, transaction::Transaction};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::types::{
    lamports_to_sol, sol_to_lamports, AssetHolding, BetValidationRequest, GoverningAsset,
    TransactionRecord, TransferIntent, WalletAddress, WalletSummary, WatchHandle,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::indexer::{AssetIndexer, HeliusClient, WebhookRequest};
use crate::rpc::{ChainRpc, SolanaRpc};

/// Holdings page requested from the indexer; later pages are never fetched
pub const HOLDINGS_PAGE: u32 = 1;
/// Holdings page size
pub const HOLDINGS_PAGE_SIZE: u32 = 1000;

/// Behavioural settings fixed at construction
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub governing_asset: GoverningAsset,
    pub default_history_limit: usize,
    pub history_fetch_concurrency: usize,
    pub webhook_type: String,
    pub webhook_transaction_types: Vec<String>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            governing_asset: GoverningAsset::Native,
            default_history_limit: 10,
            history_fetch_concurrency: 4,
            webhook_type: "enhanced".to_string(),
            webhook_transaction_types: vec!["ANY".to_string()],
        }
    }
}

impl LedgerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            governing_asset: config.governing_asset(),
            default_history_limit: config.history.default_limit,
            history_fetch_concurrency: config.history.fetch_concurrency.max(1),
            webhook_type: config.helius.webhook_type.clone(),
            webhook_transaction_types: config.helius.transaction_types.clone(),
        }
    }
}

/// Balance, eligibility and transfer assembly over a chain RPC and an indexer
pub struct WalletLedgerAdapter {
    rpc: Arc<dyn ChainRpc>,
    indexer: Arc<dyn AssetIndexer>,
    settings: LedgerSettings,
}

impl WalletLedgerAdapter {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        indexer: Arc<dyn AssetIndexer>,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            rpc,
            indexer,
            settings,
        }
    }

    /// Wire the Solana RPC and Helius clients described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.rpc_endpoint();
        let rpc = SolanaRpc::new(endpoint.clone(), config.rpc_timeout());
        let indexer = HeliusClient::new(
            config.helius.api_key.clone(),
            endpoint,
            config.helius.api_base_url.clone(),
            config.rpc_timeout(),
        )?;

        info!(
            "Wallet ledger ready on {:?} (governing asset: {})",
            config.network.cluster,
            config.governing_asset()
        );
        if !config.governing_asset().is_native() {
            warn!("Token-governed games cannot build transfers; only SOL transfers are supported");
        }

        Ok(Self::new(
            Arc::new(rpc),
            Arc::new(indexer),
            LedgerSettings::from_config(config),
        ))
    }

    pub fn governing_asset(&self) -> &GoverningAsset {
        &self.settings.governing_asset
    }

    /// Native balance in SOL
    pub async fn get_native_balance(&self, wallet: &str) -> Result<f64> {
        let address = WalletAddress::parse(wallet)?;
        let lamports = self.rpc.get_balance(address.pubkey()).await?;
        Ok(lamports_to_sol(lamports))
    }

    /// Assets owned by `wallet`, first indexer page only
    ///
    /// Wallets holding more than [`HOLDINGS_PAGE_SIZE`] assets get a
    /// truncated list.
    pub async fn get_wallet_holdings(&self, wallet: &str) -> Result<Vec<AssetHolding>> {
        let address = WalletAddress::parse(wallet)?;
        let assets = self
            .indexer
            .get_assets_by_owner(&address.to_string(), HOLDINGS_PAGE, HOLDINGS_PAGE_SIZE)
            .await?;

        if assets.len() >= HOLDINGS_PAGE_SIZE as usize {
            warn!(
                "Holdings for {} filled a full page ({}); list may be incomplete",
                address,
                assets.len()
            );
        }

        Ok(assets
            .into_iter()
            .map(|asset| AssetHolding {
                asset_id: asset.id,
                amount: asset.balance,
            })
            .collect())
    }

    /// Balance of `asset_id`, or 0 when absent, lacking metadata, or on any error
    pub async fn get_asset_balance(&self, wallet: &str, asset_id: &str) -> f64 {
        match self.get_wallet_holdings(wallet).await {
            Ok(holdings) => holdings
                .iter()
                .find(|h| h.asset_id == asset_id)
                .and_then(|h| h.amount)
                .unwrap_or(0.0),
            Err(e) => {
                error!("Failed to get balance of {} for {}: {}", asset_id, wallet, e);
                0.0
            }
        }
    }

    /// Balance in the governing asset
    ///
    /// Native lookups propagate errors; token lookups already fall back to 0.
    pub async fn governing_balance(&self, wallet: &str) -> Result<f64> {
        match &self.settings.governing_asset {
            GoverningAsset::Native => self.get_native_balance(wallet).await,
            GoverningAsset::Token(mint) => Ok(self.get_asset_balance(wallet, mint).await),
        }
    }

    /// Whether `wallet` holds at least `bet_amount` of the governing asset
    ///
    /// Never fails: an unreadable wallet cannot bet.
    pub async fn can_cover_bet(&self, wallet: &str, bet_amount: f64) -> bool {
        match self.governing_balance(wallet).await {
            Ok(balance) => {
                debug!(
                    "Bet check for {}: balance {} vs bet {}",
                    wallet, balance, bet_amount
                );
                balance >= bet_amount
            }
            Err(e) => {
                error!("Failed to validate bet for {}: {}", wallet, e);
                false
            }
        }
    }

    pub async fn validate_bet(&self, request: &BetValidationRequest) -> bool {
        self.can_cover_bet(&request.wallet, request.amount).await
    }

    /// Assemble an unsigned transfer of `amount` governing units
    ///
    /// `from` pays the fee; the latest blockhash is the validity anchor.
    /// Token mode always fails with [`Error::NotImplemented`].
    pub async fn build_transfer(&self, from: &str, to: &str, amount: f64) -> Result<Transaction> {
        if let GoverningAsset::Token(mint) = &self.settings.governing_asset {
            return Err(Error::NotImplemented(format!(
                "token transfers for mint {} are not supported",
                mint
            )));
        }

        let from = WalletAddress::parse(from)?;
        let to = WalletAddress::parse(to)?;

        // Sub-lamport amounts round to zero and are rejected with the rest
        let lamports = sol_to_lamports(amount)
            .filter(|&lamports| lamports > 0)
            .ok_or_else(|| {
                Error::InvalidAmount(format!(
                    "transfer amount must be between 1 lamport and {} lamports, got {} SOL",
                    u64::MAX,
                    amount
                ))
            })?;
        let instruction = system_instruction::transfer(from.pubkey(), to.pubkey(), lamports);
        let blockhash = self.rpc.get_latest_checkpoint().await?;
        let message = Message::new_with_blockhash(&[instruction], Some(from.pubkey()), &blockhash);

        info!(
            "Built unsigned transfer: {} lamports from {} to {}",
            lamports, from, to
        );

        Ok(Transaction::new_unsigned(message))
    }

    pub async fn build_transfer_from(&self, intent: &TransferIntent) -> Result<Transaction> {
        self.build_transfer(&intent.from, &intent.to, intent.amount)
            .await
    }

    /// Register a push subscription for all activity on `wallet`
    pub async fn register_wallet_watch(
        &self,
        wallet: &str,
        delivery_url: &str,
    ) -> Result<WatchHandle> {
        let address = WalletAddress::parse(wallet)?;
        url::Url::parse(delivery_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", delivery_url, e)))?;

        let request = WebhookRequest {
            url: delivery_url.to_string(),
            transaction_types: self.settings.webhook_transaction_types.clone(),
            addresses: vec![address.to_string()],
            webhook_type: self.settings.webhook_type.clone(),
        };

        let webhook = self.indexer.create_webhook(&request).await?;
        info!("Webhook {} registered for {}", webhook.id, address);

        Ok(WatchHandle {
            id: webhook.id,
            url: if webhook.url.is_empty() {
                request.url
            } else {
                webhook.url
            },
            addresses: if webhook.addresses.is_empty() {
                request.addresses
            } else {
                webhook.addresses
            },
        })
    }

    pub async fn list_wallet_watches(&self) -> Result<Vec<WatchHandle>> {
        let webhooks = self.indexer.list_webhooks().await?;
        Ok(webhooks
            .into_iter()
            .map(|w| WatchHandle {
                id: w.id,
                url: w.url,
                addresses: w.addresses,
            })
            .collect())
    }

    pub async fn remove_wallet_watch(&self, id: &str) -> Result<()> {
        self.indexer.delete_webhook(id).await?;
        info!("Webhook {} removed", id);
        Ok(())
    }

    /// Up to `limit` most recent transactions, newest first
    ///
    /// Signatures without detail are dropped. Any failure yields an empty list.
    pub async fn get_transaction_history(
        &self,
        wallet: &str,
        limit: usize,
    ) -> Vec<TransactionRecord> {
        match self.fetch_history(wallet, limit).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to get transaction history for {}: {}", wallet, e);
                Vec::new()
            }
        }
    }

    /// History using the configured default limit
    pub async fn get_recent_history(&self, wallet: &str) -> Vec<TransactionRecord> {
        self.get_transaction_history(wallet, self.settings.default_history_limit)
            .await
    }

    async fn fetch_history(&self, wallet: &str, limit: usize) -> Result<Vec<TransactionRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let address = WalletAddress::parse(wallet)?;
        let signatures = self
            .rpc
            .get_signatures_for_address(address.pubkey(), limit)
            .await?;

        let rpc = &self.rpc;
        let signatures = signatures.into_iter().take(limit);
        // `buffered` keeps signature-list order regardless of completion order
        let records: Vec<Option<TransactionRecord>> = stream::iter(signatures)
            .map(|signature| async move {
                let detail = rpc.get_transaction_detail(&signature).await?;
                if detail.is_none() {
                    debug!("No detail for {}, skipping", signature);
                }
                Ok::<_, Error>(detail.map(|d| TransactionRecord {
                    signature,
                    slot: d.slot,
                    block_time: d.block_time,
                    fee: d.fee.unwrap_or(0),
                }))
            })
            .buffered(self.settings.history_fetch_concurrency.max(1))
            .try_collect()
            .await?;

        Ok(records.into_iter().flatten().collect())
    }

    /// Balances plus recent activity for display
    pub async fn wallet_summary(&self, wallet: &str) -> Result<WalletSummary> {
        let native_balance = self.get_native_balance(wallet).await?;
        let governing_balance = match &self.settings.governing_asset {
            GoverningAsset::Native => native_balance,
            GoverningAsset::Token(mint) => self.get_asset_balance(wallet, mint).await,
        };
        let recent_transactions = self.get_recent_history(wallet).await;

        Ok(WalletSummary {
            wallet: wallet.trim().to_string(),
            native_balance,
            governing_asset: self.settings.governing_asset.clone(),
            governing_balance,
            recent_transactions,
        })
    }
}
