//! CLI command implementations

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::DateTime;
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::ledger::{TransactionRecord, WalletLedgerAdapter};

fn ledger(config: &Config) -> Result<WalletLedgerAdapter> {
    WalletLedgerAdapter::from_config(config).context("Failed to initialize wallet ledger")
}

/// Show native SOL balance
pub async fn balance(config: &Config, wallet: &str) -> Result<()> {
    let balance = ledger(config)?.get_native_balance(wallet).await?;
    println!("{} SOL", balance);
    Ok(())
}

/// List assets held by a wallet (first indexer page)
pub async fn holdings(config: &Config, wallet: &str) -> Result<()> {
    let holdings = ledger(config)?.get_wallet_holdings(wallet).await?;

    println!("\n=== HOLDINGS ({}) ===\n", holdings.len());
    if holdings.is_empty() {
        println!("No assets found.");
        return Ok(());
    }

    println!("{:<46} {:>20}", "ASSET", "BALANCE");
    println!("{}", "-".repeat(67));
    for holding in &holdings {
        match holding.amount {
            Some(amount) => println!("{:<46} {:>20}", holding.asset_id, amount),
            None => println!("{:<46} {:>20}", holding.asset_id, "-"),
        }
    }
    Ok(())
}

/// Show balance of one asset
pub async fn asset_balance(config: &Config, wallet: &str, asset: &str) -> Result<()> {
    let balance = ledger(config)?.get_asset_balance(wallet, asset).await;
    println!("{}", balance);
    Ok(())
}

/// Check whether a wallet can cover a bet in the governing asset
pub async fn can_bet(config: &Config, wallet: &str, amount: f64) -> Result<()> {
    let ledger = ledger(config)?;
    let covered = ledger.can_cover_bet(wallet, amount).await;
    println!(
        "{}: bet of {} {} {}",
        wallet,
        amount,
        ledger.governing_asset(),
        if covered { "ALLOWED" } else { "REJECTED" }
    );
    Ok(())
}

/// Build an unsigned transfer and print it for external signing
pub async fn transfer(config: &Config, from: &str, to: &str, amount: f64) -> Result<()> {
    let tx = ledger(config)?.build_transfer(from, to, amount).await?;
    let bytes = bincode::serialize(&tx).context("Failed to serialize transaction")?;

    info!("Unsigned transaction is {} bytes", bytes.len());
    println!("{}", STANDARD.encode(bytes));
    Ok(())
}

/// Register a webhook for a wallet
pub async fn watch(config: &Config, wallet: &str, url: &str) -> Result<()> {
    let handle = ledger(config)?.register_wallet_watch(wallet, url).await?;
    println!("Webhook {} -> {} ({})", handle.id, handle.url, handle.addresses.join(", "));
    Ok(())
}

/// List registered webhooks
pub async fn watches(config: &Config) -> Result<()> {
    let watches = ledger(config)?.list_wallet_watches().await?;

    println!("\n=== WEBHOOKS ({}) ===\n", watches.len());
    for handle in &watches {
        println!("{:<38} {}", handle.id, handle.url);
        for address in &handle.addresses {
            println!("    {}", address);
        }
    }
    Ok(())
}

/// Delete a webhook
pub async fn unwatch(config: &Config, id: &str) -> Result<()> {
    ledger(config)?.remove_wallet_watch(id).await?;
    println!("Webhook {} removed", id);
    Ok(())
}

/// Show recent on-chain transactions
pub async fn history(config: &Config, wallet: &str, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.history.default_limit);
    let records = ledger(config)?.get_transaction_history(wallet, limit).await;

    println!("\n=== TRANSACTION HISTORY ===\n");
    if records.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{:<20} {:<12} {:<10} {}", "TIME", "SLOT", "FEE", "SIGNATURE");
    println!("{}", "-".repeat(110));
    for record in &records {
        println!(
            "{:<20} {:<12} {:<10} {}",
            format_block_time(record),
            record.slot,
            record.fee,
            record.signature
        );
    }
    Ok(())
}

/// Print balances and recent history as JSON
pub async fn summary(config: &Config, wallet: &str) -> Result<()> {
    let summary = ledger(config)?.wallet_summary(wallet).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Process exit code for a failed command: 2 for rejected input, 1 otherwise
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_invalid_input() => 2,
        _ => 1,
    }
}

fn format_block_time(record: &TransactionRecord) -> String {
    record
        .block_time
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_block_time() {
        let mut record = TransactionRecord {
            signature: "sig".into(),
            slot: 1,
            block_time: Some(0),
            fee: 5000,
        };
        assert_eq!(format_block_time(&record), "1970-01-01 00:00:00");
        record.block_time = None;
        assert_eq!(format_block_time(&record), "-");
    }

    #[test]
    fn test_exit_code() {
        let invalid = anyhow::Error::from(Error::InvalidAddress("nope".into()));
        assert_eq!(exit_code(&invalid), 2);

        let amount = anyhow::Error::from(Error::InvalidAmount("-1".into()))
            .context("Failed to build transfer");
        assert_eq!(exit_code(&amount), 2);

        let rpc = anyhow::Error::from(Error::RpcUnavailable("timeout".into()));
        assert_eq!(exit_code(&rpc), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
