//! Wager Ledger - wallet balances, bet checks and unsigned transfers for Solana games
//!
//! # WARNING
//! - `transfer` only assembles a transaction; it must be signed and sent elsewhere.
//! - Blockhashes expire after roughly a minute; sign promptly.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use wager_ledger::cli::commands;
use wager_ledger::config::Config;

/// Wager Ledger - wallet balance and bet eligibility tool
#[derive(Parser)]
#[command(name = "wager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show native SOL balance
    Balance {
        /// Wallet address
        wallet: String,
    },

    /// List assets held by a wallet
    Holdings {
        /// Wallet address
        wallet: String,
    },

    /// Show balance of a single asset
    AssetBalance {
        /// Wallet address
        wallet: String,

        /// Asset (mint) id
        asset: String,
    },

    /// Check whether a wallet can cover a bet
    CanBet {
        /// Wallet address
        wallet: String,

        /// Bet amount in governing units
        amount: f64,
    },

    /// Build an unsigned transfer (base64, bincode-encoded)
    Transfer {
        /// Fee payer and source wallet
        from: String,

        /// Destination wallet
        to: String,

        /// Amount in governing units
        amount: f64,
    },

    /// Register a webhook for wallet activity
    Watch {
        /// Wallet address
        wallet: String,

        /// Delivery URL
        #[arg(long, env = "WAGER_WEBHOOK_URL")]
        url: String,
    },

    /// List registered webhooks
    Watches,

    /// Delete a webhook
    Unwatch {
        /// Webhook id
        id: String,
    },

    /// Show recent on-chain transactions
    History {
        /// Wallet address
        wallet: String,

        /// Number of records to show (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show balances and recent activity as JSON
    Summary {
        /// Wallet address
        wallet: String,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wager_ledger=info".parse()?),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; a missing API key stops here
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Balance { wallet } => commands::balance(&config, &wallet).await,
        Commands::Holdings { wallet } => commands::holdings(&config, &wallet).await,
        Commands::AssetBalance { wallet, asset } => {
            commands::asset_balance(&config, &wallet, &asset).await
        }
        Commands::CanBet { wallet, amount } => commands::can_bet(&config, &wallet, amount).await,
        Commands::Transfer { from, to, amount } => {
            commands::transfer(&config, &from, &to, amount).await
        }
        Commands::Watch { wallet, url } => commands::watch(&config, &wallet, &url).await,
        Commands::Watches => commands::watches(&config).await,
        Commands::Unwatch { id } => commands::unwatch(&config, &id).await,
        Commands::History { wallet, limit } => commands::history(&config, &wallet, limit).await,
        Commands::Summary { wallet } => commands::summary(&config, &wallet).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        let code = commands::exit_code(&e);
        if code == 2 {
            error!("Invalid input: {:#}", e);
        } else {
            error!("Command failed: {:#}", e);
        }
        std::process::exit(code);
    }

    Ok(())
}
