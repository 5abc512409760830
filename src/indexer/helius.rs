//! Helius API client
//!
//! Provides:
//! - Wallet asset listing (DAS `getAssetsByOwner`, fungible tokens included)
//! - Webhook registration, listing and removal

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{AssetIndexer, IndexedAsset, Webhook, WebhookRequest};
use crate::error::{Error, Result};

/// Helius API client
pub struct HeliusClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: String,
    /// Base URL for REST API
    rest_base_url: String,
    /// URL for the JSON-RPC (DAS) API
    rpc_url: String,
}

impl HeliusClient {
    /// Create a new Helius client
    pub fn new(
        api_key: String,
        rpc_url: String,
        rest_base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            rest_base_url: rest_base_url.trim_end_matches('/').to_string(),
            rpc_url,
        })
    }

    fn webhooks_url(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => format!(
                "{}/v0/webhooks/{}?api-key={}",
                self.rest_base_url, id, self.api_key
            ),
            None => format!("{}/v0/webhooks?api-key={}", self.rest_base_url, self.api_key),
        }
    }
}

/// Turn a non-2xx response into an error carrying the body
async fn check_status(response: Response, what: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::RpcUnavailable(format!("Helius {} error {}: {}", what, status, body)))
}

#[async_trait]
impl AssetIndexer for HeliusClient {
    async fn get_assets_by_owner(
        &self,
        owner: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<IndexedAsset>> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "wager-assets",
            "method": "getAssetsByOwner",
            "params": {
                "ownerAddress": owner,
                "page": page,
                "limit": limit,
                "displayOptions": {
                    "showFungible": true
                }
            }
        });

        debug!("Fetching assets for {} (page {}, limit {})", owner, page, limit);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Helius RPC request failed: {}", e)))?;
        let response = check_status(response, "RPC").await?;

        let rpc_response: HeliusRpcResponse<AssetList> = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse RPC response: {}", e)))?;

        Ok(rpc_response.into_result()?.into_assets())
    }

    async fn create_webhook(&self, request: &WebhookRequest) -> Result<Webhook> {
        debug!("Creating webhook for {:?} -> {}", request.addresses, request.url);

        let response = self
            .client
            .post(self.webhooks_url(None))
            .json(request)
            .send()
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Helius request failed: {}", e)))?;
        let response = check_status(response, "webhook").await?;

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse webhook response: {}", e)))
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        let response = self
            .client
            .get(self.webhooks_url(None))
            .send()
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Helius request failed: {}", e)))?;
        let response = check_status(response, "webhook").await?;

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse webhook list: {}", e)))
    }

    async fn delete_webhook(&self, id: &str) -> Result<()> {
        debug!("Deleting webhook {}", id);

        let response = self
            .client
            .delete(self.webhooks_url(Some(id)))
            .send()
            .await
            .map_err(|e| Error::RpcUnavailable(format!("Helius request failed: {}", e)))?;
        check_status(response, "webhook").await?;

        Ok(())
    }
}

// ============ Helius API Response Types ============
// These structs are for API deserialization - not all fields are used but are required for parsing

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct HeliusRpcResponse<T> {
    jsonrpc: String,
    id: String,
    result: Option<T>,
    error: Option<RpcError>,
}

impl<T> HeliusRpcResponse<T> {
    fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(Error::RpcUnavailable(format!(
                "Helius RPC error {}: {}",
                error.code, error.message
            )));
        }
        self.result
            .ok_or_else(|| Error::RpcUnavailable("No result in Helius RPC response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct AssetList {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    items: Vec<DasAsset>,
}

impl AssetList {
    fn into_assets(self) -> Vec<IndexedAsset> {
        self.items
            .into_iter()
            .map(|item| IndexedAsset {
                id: item.id,
                balance: item.token_info.and_then(|info| info.balance),
            })
            .collect()
    }
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct DasAsset {
    id: String,
    interface: Option<String>,
    token_info: Option<TokenInfo>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct TokenInfo {
    balance: Option<f64>,
    decimals: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HeliusClient {
        HeliusClient::new(
            "test123".into(),
            "https://devnet.helius-rpc.com/?api-key=test123".into(),
            "https://api.helius.xyz/".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_webhooks_url() {
        let c = client();
        assert_eq!(
            c.webhooks_url(None),
            "https://api.helius.xyz/v0/webhooks?api-key=test123"
        );
        assert_eq!(
            c.webhooks_url(Some("abc")),
            "https://api.helius.xyz/v0/webhooks/abc?api-key=test123"
        );
    }

    #[test]
    fn test_parse_assets_response() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": "wager-assets",
            "result": {
                "total": 2,
                "limit": 1000,
                "page": 1,
                "items": [
                    {"id": "MintA", "interface": "FungibleToken",
                     "token_info": {"balance": 1500, "decimals": 2}},
                    {"id": "NftB", "interface": "V1_NFT"}
                ]
            }
        }"#;
        let parsed: HeliusRpcResponse<AssetList> = serde_json::from_str(body).unwrap();
        let assets = parsed.into_result().unwrap().into_assets();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, "MintA");
        assert_eq!(assets[0].balance, Some(1500.0));
        assert_eq!(assets[1].id, "NftB");
        assert_eq!(assets[1].balance, None);
    }

    #[test]
    fn test_rpc_error_object() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": "wager-assets",
            "error": {"code": -32602, "message": "invalid owner"}
        }"#;
        let parsed: HeliusRpcResponse<AssetList> = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed.into_result(), Err(Error::RpcUnavailable(_))));
    }

    #[test]
    fn test_webhook_request_shape() {
        let request = WebhookRequest {
            url: "https://game.example/hook".into(),
            transaction_types: vec!["ANY".into()],
            addresses: vec!["Wallet1".into()],
            webhook_type: "enhanced".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["webhookURL"], "https://game.example/hook");
        assert_eq!(json["transactionTypes"][0], "ANY");
        assert_eq!(json["accountAddresses"][0], "Wallet1");
        assert_eq!(json["webhookType"], "enhanced");
    }

    #[test]
    fn test_parse_webhook_list() {
        let body = r#"[
            {"webhookID": "wh-1", "wallet": "x", "webhookURL": "https://a/hook",
             "transactionTypes": ["ANY"], "accountAddresses": ["W1"], "webhookType": "enhanced"},
            {"webhookID": "wh-2"}
        ]"#;
        let hooks: Vec<Webhook> = serde_json::from_str(body).unwrap();
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].addresses, vec!["W1".to_string()]);
        assert!(hooks[1].url.is_empty());
    }
}
