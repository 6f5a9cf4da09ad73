// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deploy the precompiled SpaceBucks contract to the node at `RPC_URL`.
//!
//! The creation transaction is signed by the same sender key the wallet
//! service uses and goes through the same submit and confirm path.
//!
//! ```text
//! solc --bin contracts/SpaceBucks.sol -o build/
//! deploy --bytecode build/SpaceBucks.bin --out deployment.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy::{hex, primitives::U256};
use anyhow::{bail, Context};
use clap::Parser;

use spacebucks_wallet::{
    blockchain::{
        deploy_token, AlloyChainClient, ChainClient, ConfirmationPolicy, Submitter, TokenParams,
    },
    config::{ChainConfig, LogFormat},
    telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "deploy", version, about = "Deploy the SpaceBucks token contract")]
struct Cli {
    /// Hex creation bytecode as written by `solc --bin`
    #[arg(long)]
    bytecode: PathBuf,

    /// Token name
    #[arg(long, default_value = "SpaceBucks")]
    name: String,

    /// Token symbol
    #[arg(long, default_value = "SPX")]
    symbol: String,

    /// Initial supply in whole tokens, minted to the sender
    #[arg(long, default_value_t = 1000)]
    supply: u64,

    /// Also write the deployment record to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

fn read_bytecode(path: &Path) -> anyhow::Result<Vec<u8>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    if text.is_empty() {
        bail!("{} contains no bytecode", path.display());
    }
    hex::decode(text).with_context(|| format!("{} is not hex bytecode", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    telemetry::init(LogFormat::from_lookup(|k| std::env::var(k).ok())?);

    let bytecode = read_bytecode(&cli.bytecode)?;
    let config = ChainConfig::from_env().context("Invalid configuration")?;

    let client: Arc<dyn ChainClient> = Arc::new(AlloyChainClient::connect(config.rpc_url.clone()));
    let chain_id = client
        .chain_id()
        .await
        .context("Failed to read chain id from the node")?;

    tracing::info!(
        chain_id,
        deployer = %config.signer.address(),
        name = %cli.name,
        symbol = %cli.symbol,
        supply = cli.supply,
        "Deploying token contract"
    );

    let submitter = Submitter::new(
        client,
        &config.signer,
        chain_id,
        ConfirmationPolicy::default(),
    );
    let params = TokenParams {
        name: cli.name,
        symbol: cli.symbol,
        supply: U256::from(cli.supply),
    };
    let deployment = deploy_token(&submitter, &bytecode, &params)
        .await
        .context("Deployment failed")?;

    let json = serde_json::to_string_pretty(&deployment)?;
    println!("{json}");

    if let Some(out) = &cli.out {
        std::fs::write(out, format!("{json}\n"))
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    Ok(())
}
