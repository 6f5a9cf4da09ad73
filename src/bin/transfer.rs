// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Send SPX from the configured sender key without starting the server.
//!
//! Reads the same environment as the wallet service and prints the sender's
//! balance before the transfer, then both balances once it is confirmed.
//!
//! ```text
//! transfer --to 0x70997970C51812dc3A010C7d01b50e0d17dc79C8 --amount 50
//! ```

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::Context;
use clap::Parser;

use spacebucks_wallet::{
    blockchain::{
        format_amount, AlloyChainClient, ChainClient, Submitter, TokenInfo, TransferPipeline,
        WalletError,
    },
    config::{AppConfig, LogFormat},
    telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "transfer", version, about = "Send SPX from the wallet's sender key")]
struct Cli {
    /// Recipient address, 0x followed by 40 hex characters
    #[arg(long)]
    to: String,

    /// Amount in display units, e.g. 50 or 0.25
    #[arg(long)]
    amount: String,
}

async fn balance(
    client: &dyn ChainClient,
    token: &TokenInfo,
    owner: Address,
) -> anyhow::Result<String> {
    let units = client
        .token_balance(token.contract_address, owner)
        .await
        .with_context(|| format!("Failed to read balance of {owner}"))?;
    Ok(format!("{} {}", format_amount(units, token.decimals), token.symbol))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    telemetry::init(LogFormat::from_lookup(|k| std::env::var(k).ok())?);

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let client: Arc<dyn ChainClient> =
        Arc::new(AlloyChainClient::connect(config.chain.rpc_url.clone()));

    let chain_id = client
        .chain_id()
        .await
        .context("Failed to read chain id from the node")?;
    let metadata = client
        .token_metadata(config.contract_address)
        .await
        .context("Failed to read token metadata from the contract")?;
    let token = TokenInfo::new(metadata, config.contract_address, chain_id);
    let min_amount = config.min_transfer_units(token.decimals)?;

    let submitter = Arc::new(Submitter::new(
        client.clone(),
        &config.chain.signer,
        chain_id,
        config.confirmation,
    ));
    let pipeline = TransferPipeline::new(client.clone(), submitter, token.clone(), min_amount);
    let sender = pipeline.sender();

    println!("Sender: {sender}");
    println!("Balance: {}", balance(client.as_ref(), &token, sender).await?);
    println!("Sending {} {} to {}", cli.amount, token.symbol, cli.to);

    let outcome = match pipeline.submit_transfer(&cli.to, &cli.amount).await {
        Ok(outcome) => outcome,
        Err(WalletError::PendingUnconfirmed { tx_hash }) => {
            println!("Tx hash: {tx_hash:#x}");
            println!("Submitted, not yet confirmed. Check again later.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Transfer failed"),
    };

    println!("Tx hash: {:#x}", outcome.receipt.tx_hash);
    println!("Confirmed in block {}", outcome.receipt.block_number);
    println!("Sender balance: {}", balance(client.as_ref(), &token, sender).await?);
    println!(
        "Recipient balance: {}",
        balance(client.as_ref(), &token, outcome.recipient).await?
    );

    Ok(())
}
