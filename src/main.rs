// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;

use spacebucks_wallet::{
    api::router,
    blockchain::{
        AlloyChainClient, ChainClient, QueryService, Submitter, TokenInfo, TransferPipeline,
    },
    config::{AppConfig, LogFormat},
    indexer::HistoryIndexer,
    state::AppState,
    storage::{HistoryDb, HISTORY_DB_FILE},
    telemetry,
};

/// How long in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    let _ = rustls::crypto::ring::default_provider().install_default();

    telemetry::init(LogFormat::from_lookup(|k| std::env::var(k).ok())?);

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{e:#}"), "SpaceBucks wallet failed");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let client: Arc<dyn ChainClient> =
        Arc::new(AlloyChainClient::connect(config.chain.rpc_url.clone()));

    // Nothing useful can be served without the chain id and token metadata.
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

    tracing::info!(
        token = %token.name,
        symbol = %token.symbol,
        decimals = token.decimals,
        contract = %token.contract_address,
        chain_id,
        sender = %config.chain.signer.address(),
        "Connected to token contract"
    );

    let submitter = Arc::new(Submitter::new(
        client.clone(),
        &config.chain.signer,
        chain_id,
        config.confirmation,
    ));
    let transfers = Arc::new(TransferPipeline::new(
        client.clone(),
        submitter,
        token.clone(),
        min_amount,
    ));

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
    let db = Arc::new(HistoryDb::open(&config.data_dir.join(HISTORY_DB_FILE))?);
    let indexer = Arc::new(HistoryIndexer::new(
        client.clone(),
        db,
        token.clone(),
        config.history_chunk_size,
    )?);
    let queries = Arc::new(QueryService::new(client.clone(), token, indexer.clone()));

    let shutdown = CancellationToken::new();
    let sync_task = config
        .history_poll_interval
        .map(|interval| tokio::spawn(indexer.run(interval, shutdown.clone())));

    let app = router(AppState::new(transfers, queries, client));

    let handle = Handle::new();
    {
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
    }

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .context("Failed to load TLS certificate")?;
            tracing::info!(%addr, "SpaceBucks wallet listening on https (dashboard at /dapp, docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            tracing::info!(%addr, "SpaceBucks wallet listening on http (dashboard at /dapp, docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }
    }

    shutdown.cancel();
    if let Some(task) = sync_task {
        let _ = task.await;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
