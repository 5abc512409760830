//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;
use crate::ledger::types::{GoverningAsset, WalletAddress};

/// Environment variable holding the Helius API key
pub const API_KEY_ENV: &str = "HELIUS_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub helius: HeliusConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Solana cluster selector
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Devnet,
    #[serde(alias = "mainnet-beta")]
    Mainnet,
}

impl Cluster {
    /// Subdomain used by the Helius RPC endpoints
    pub fn helius_subdomain(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Mainnet => "mainnet",
        }
    }
}

impl std::str::FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            _ => Err(anyhow::anyhow!("Unsupported network: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_cluster")]
    pub cluster: Cluster,
    /// Full RPC URL; derived from the cluster and API key when unset
    #[serde(default)]
    pub rpc_endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
            rpc_endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeliusConfig {
    /// Filled from `HELIUS_API_KEY` when not set here
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_webhook_type")]
    pub webhook_type: String,
    #[serde(default = "default_transaction_types")]
    pub transaction_types: Vec<String>,
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            webhook_type: default_webhook_type(),
            transaction_types: default_transaction_types(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameConfig {
    /// Mint of the custom game token; native SOL when unset
    #[serde(default)]
    pub token_mint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
    /// Max in-flight transaction detail lookups
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

// Default value functions
fn default_cluster() -> Cluster {
    std::env::var("SOLANA_NETWORK")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Cluster::Devnet)
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_api_base_url() -> String {
    "https://api.helius.xyz".into()
}

fn default_webhook_type() -> String {
    "enhanced".into()
}

fn default_transaction_types() -> Vec<String> {
    vec!["ANY".into()]
}

fn default_history_limit() -> usize {
    10
}

fn default_fetch_concurrency() -> usize {
    4
}

/// `WAGER_<SECTION>__<KEY>` overrides, e.g. `WAGER_NETWORK__CLUSTER=mainnet`
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix("WAGER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Fails if no API key is available from the file, `WAGER_` overrides
    /// or `HELIUS_API_KEY`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, env_overrides(), std::env::var(API_KEY_ENV).ok())
    }

    fn load_with<P: AsRef<Path>>(
        path: P,
        env: config::Environment,
        api_key_env: Option<String>,
    ) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.resolve_api_key(api_key_env)?;
        config.validate()?;

        Ok(config)
    }

    /// Fill the API key from the environment value if the sources left it blank
    pub fn resolve_api_key(&mut self, from_env: Option<String>) -> Result<()> {
        if self.helius.api_key.trim().is_empty() {
            self.helius.api_key = from_env.unwrap_or_default().trim().to_string();
        }
        if self.helius.api_key.is_empty() {
            return Err(Error::MissingEnvVar(API_KEY_ENV.to_string()).into());
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.helius.api_key.trim().is_empty() {
            return Err(Error::MissingEnvVar(API_KEY_ENV.to_string()).into());
        }

        if let GoverningAsset::Token(mint) = self.governing_asset() {
            WalletAddress::parse(&mint)
                .with_context(|| format!("Invalid game.token_mint: {}", mint))?;
        }

        if self.history.fetch_concurrency == 0 {
            anyhow::bail!("history.fetch_concurrency must be at least 1");
        }

        if self.network.timeout_ms == 0 {
            anyhow::bail!("network.timeout_ms must be positive");
        }

        if self.helius.transaction_types.is_empty() {
            anyhow::bail!("helius.transaction_types cannot be empty");
        }

        url::Url::parse(&self.helius.api_base_url)
            .with_context(|| format!("Invalid helius.api_base_url: {}", self.helius.api_base_url))?;

        if let Some(endpoint) = &self.network.rpc_endpoint {
            url::Url::parse(endpoint).context("Invalid network.rpc_endpoint")?;
        }

        Ok(())
    }

    /// RPC endpoint for the selected cluster
    pub fn rpc_endpoint(&self) -> String {
        match &self.network.rpc_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.helius-rpc.com/?api-key={}",
                self.network.cluster.helius_subdomain(),
                self.helius.api_key
            ),
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.network.timeout_ms)
    }

    /// Asset that governs bets and transfers
    pub fn governing_asset(&self) -> GoverningAsset {
        GoverningAsset::from_token_mint(self.game.token_mint.as_deref())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Network:
    cluster: {:?}
    rpc_endpoint: {}
    timeout: {}ms
  Helius:
    api_base_url: {}
    api_key: {}
    webhook_type: {}
    transaction_types: {:?}
  Game:
    governing_asset: {}
  History:
    default_limit: {}
    fetch_concurrency: {}
"#,
            self.network.cluster,
            mask_url(&self.rpc_endpoint()),
            self.network.timeout_ms,
            self.helius.api_base_url,
            if self.helius.api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.helius.webhook_type,
            self.helius.transaction_types,
            self.governing_asset(),
            self.history.default_limit,
            self.history.fetch_concurrency,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;
    use std::io::Write;

    fn test_config() -> Config {
        Config {
            network: NetworkConfig {
                cluster: Cluster::Devnet,
                rpc_endpoint: None,
                timeout_ms: 30000,
            },
            helius: HeliusConfig {
                api_key: "secret".into(),
                ..HeliusConfig::default()
            },
            game: GameConfig::default(),
            history: HistoryConfig::default(),
        }
    }

    #[test]
    fn test_cluster_deserialize() {
        let cluster: Cluster = serde_json::from_str(r#""mainnet-beta""#).unwrap();
        assert_eq!(cluster, Cluster::Mainnet);
        let cluster: Cluster = serde_json::from_str(r#""devnet""#).unwrap();
        assert_eq!(cluster, Cluster::Devnet);
        assert!("testnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_rpc_endpoint_from_cluster() {
        let mut config = test_config();
        assert_eq!(
            config.rpc_endpoint(),
            "https://devnet.helius-rpc.com/?api-key=secret"
        );
        config.network.cluster = Cluster::Mainnet;
        assert_eq!(
            config.rpc_endpoint(),
            "https://mainnet.helius-rpc.com/?api-key=secret"
        );
        config.network.rpc_endpoint = Some("http://127.0.0.1:8899".into());
        assert_eq!(config.rpc_endpoint(), "http://127.0.0.1:8899");
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let mut config = test_config();
        config.helius.api_key = String::new();

        let err = config.resolve_api_key(None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingEnvVar(var)) if var == API_KEY_ENV
        ));

        assert!(config.resolve_api_key(Some("   ".into())).is_err());
        config.resolve_api_key(Some("from-env".into())).unwrap();
        assert_eq!(config.helius.api_key, "from-env");
    }

    #[test]
    fn test_file_api_key_wins_over_env() {
        let mut config = test_config();
        config.resolve_api_key(Some("from-env".into())).unwrap();
        assert_eq!(config.helius.api_key, "secret");
    }

    #[test]
    fn test_validate_token_mint() {
        let mut config = test_config();
        assert!(config.validate().is_ok());
        assert!(config.governing_asset().is_native());

        config.game.token_mint = Some("definitely not a mint".into());
        assert!(config.validate().is_err());

        let mint = Pubkey::new_unique().to_string();
        config.game.token_mint = Some(mint.clone());
        assert!(config.validate().is_ok());
        assert_eq!(config.governing_asset(), GoverningAsset::Token(mint));
    }

    #[test]
    fn test_validate_concurrency() {
        let mut config = test_config();
        config.history.fetch_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[network]
cluster = "mainnet"

[helius]
api_key = "file-key"

[history]
fetch_concurrency = 2
"#
        )
        .unwrap();

        let env = env_overrides().source(Some(config::Map::new()));
        let config = Config::load_with(file.path(), env, None).unwrap();
        assert_eq!(config.network.cluster, Cluster::Mainnet);
        assert_eq!(config.helius.api_key, "file-key");
        assert_eq!(config.history.fetch_concurrency, 2);
        assert_eq!(config.history.default_limit, 10);
        assert_eq!(config.helius.transaction_types, vec!["ANY".to_string()]);
        assert!(config.governing_asset().is_native());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[network]
cluster = "devnet"

[helius]
api_key = "file-key"
"#
        )
        .unwrap();

        let mut vars = config::Map::new();
        vars.insert("WAGER_NETWORK__CLUSTER".to_string(), "mainnet".to_string());
        vars.insert("WAGER_HISTORY__DEFAULT_LIMIT".to_string(), "25".to_string());
        let env = env_overrides().source(Some(vars));

        let config = Config::load_with(file.path(), env, None).unwrap();
        assert_eq!(config.network.cluster, Cluster::Mainnet);
        assert_eq!(config.history.default_limit, 25);
        assert_eq!(config.helius.api_key, "file-key");
    }

    #[test]
    fn test_load_uses_api_key_env_fallback() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let env = env_overrides().source(Some(config::Map::new()));

        let config = Config::load_with(file.path(), env, Some(" env-key ".into())).unwrap();
        assert_eq!(config.helius.api_key, "env-key");

        let env = env_overrides().source(Some(config::Map::new()));
        let err = Config::load_with(file.path(), env, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_masked_display_hides_key() {
        let display = test_config().masked_display();
        assert!(!display.contains("secret"));
        assert!(display.contains("https://devnet.helius-rpc.com/?***"));
        assert!(display.contains("governing_asset: SOL"));
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("https://api.example.com"),
            "https://api.example.com"
        );
    }
}
