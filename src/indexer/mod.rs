//! Asset indexing and webhook access
//!
//! [`AssetIndexer`] is the seam the ledger adapter talks to; [`HeliusClient`]
//! backs it with the Helius DAS and webhook APIs.

mod helius;

pub use helius::HeliusClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One asset entry returned by the indexer
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedAsset {
    pub id: String,
    /// Raw token balance, absent for assets without token metadata (e.g. NFTs)
    pub balance: Option<f64>,
}

/// Push subscription request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookRequest {
    #[serde(rename = "webhookURL")]
    pub url: String,
    #[serde(rename = "transactionTypes")]
    pub transaction_types: Vec<String>,
    #[serde(rename = "accountAddresses")]
    pub addresses: Vec<String>,
    #[serde(rename = "webhookType")]
    pub webhook_type: String,
}

/// Push subscription as stored by the indexer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Webhook {
    #[serde(rename = "webhookID")]
    pub id: String,
    #[serde(rename = "webhookURL", default)]
    pub url: String,
    #[serde(rename = "accountAddresses", default)]
    pub addresses: Vec<String>,
    #[serde(rename = "transactionTypes", default)]
    pub transaction_types: Vec<String>,
    #[serde(rename = "webhookType", default)]
    pub webhook_type: Option<String>,
}

/// Indexing service surface used by the ledger
#[async_trait]
pub trait AssetIndexer: Send + Sync {
    /// One page of assets owned by `owner` (pages start at 1)
    async fn get_assets_by_owner(
        &self,
        owner: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<IndexedAsset>>;

    async fn create_webhook(&self, request: &WebhookRequest) -> Result<Webhook>;

    async fn list_webhooks(&self) -> Result<Vec<Webhook>>;

    async fn delete_webhook(&self, id: &str) -> Result<()>;
}
