// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # History Indexer
//!
//! Copies the token's `Transfer` events from the node into the local
//! [`HistoryDb`].
//!
//! ## Strategy
//!
//! Each sync reads the chain head and scans `(cursor, head]` with
//! `eth_getLogs` in fixed block-range chunks. Every chunk's entries and the
//! advanced cursor are committed together, so an interrupted sync resumes
//! from the last completed chunk. Without a cursor the scan starts at block
//! 0.
//!
//! ## Chain Restarts
//!
//! Dev nodes lose their state on restart. A head below the cursor means the
//! chain the store was built from is gone; the store is reset and rebuilt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::blockchain::{format_amount, ChainClient, ChainError, HistoryEntry, TokenInfo, TransferLog};
use crate::storage::{HistoryDb, HistoryDbError};

/// Default block chunk size per `eth_getLogs` query.
pub const DEFAULT_CHUNK_SIZE: u64 = 2000;

/// Default poll interval of the background sync.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Keeps the history store in step with the chain.
pub struct HistoryIndexer {
    client: Arc<dyn ChainClient>,
    db: Arc<HistoryDb>,
    token: TokenInfo,
    chunk_size: u64,
    /// One sync at a time; a second caller waits and then finds little to do.
    sync_lock: Mutex<()>,
}

impl HistoryIndexer {
    /// Bind the store to the token contract, dropping rows recorded for any
    /// other contract.
    pub fn new(
        client: Arc<dyn ChainClient>,
        db: Arc<HistoryDb>,
        token: TokenInfo,
        chunk_size: u64,
    ) -> Result<Self, IndexerError> {
        if db.ensure_contract(token.contract_address)? {
            tracing::info!(
                contract = %token.contract_address,
                "Token contract changed, history store reset"
            );
        }

        Ok(Self {
            client,
            db,
            token,
            chunk_size: chunk_size.max(1),
            sync_lock: Mutex::new(()),
        })
    }

    /// Scan new blocks up to the current head. Returns the number of
    /// entries added.
    pub async fn sync_once(&self) -> Result<usize, IndexerError> {
        let _guard = self.sync_lock.lock().await;

        let head = self.client.block_number().await?;
        let mut cursor = self.db.last_scanned_block()?;

        if let Some(last) = cursor {
            if head < last {
                tracing::warn!(
                    head,
                    cursor = last,
                    "Chain head is behind history cursor, rebuilding history"
                );
                self.db.reset()?;
                cursor = None;
            }
        }

        let start = match cursor {
            Some(last) => last + 1,
            None => 0,
        };
        if start > head {
            return Ok(0);
        }

        let mut added = 0;
        let mut from = start;
        while from <= head {
            let to = from.saturating_add(self.chunk_size - 1).min(head);

            let logs = self
                .client
                .transfer_logs(self.token.contract_address, from, to)
                .await?;
            let entries: Vec<HistoryEntry> =
                logs.iter().map(|log| self.to_entry(log)).collect();

            self.db.append_range(&entries, to)?;

            if !entries.is_empty() {
                tracing::debug!(
                    from_block = from,
                    to_block = to,
                    events = entries.len(),
                    "Indexed transfer events"
                );
            }
            added += entries.len();
            from = to + 1;
        }

        Ok(added)
    }

    /// Stored history, newest first.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, IndexerError> {
        Ok(self.db.list_newest_first()?)
    }

    /// Run the sync loop until the cancellation token is triggered.
    ///
    /// This should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(indexer.clone().run(poll_interval, shutdown.clone()));
    /// ```
    pub async fn run(self: Arc<Self>, poll_interval: Duration, shutdown: CancellationToken) {
        tracing::info!(
            contract = %self.token.contract_address,
            poll_secs = poll_interval.as_secs(),
            "History sync starting"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            match self.sync_once().await {
                Ok(0) => {}
                Ok(added) => tracing::info!(events = added, "History synced"),
                Err(e) => tracing::warn!(error = %e, "History sync failed, will retry"),
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {},
                _ = shutdown.cancelled() => break,
            }
        }

        tracing::info!("History sync shutting down");
    }

    fn to_entry(&self, log: &TransferLog) -> HistoryEntry {
        HistoryEntry {
            tx_hash: format!("{:#x}", log.tx_hash),
            from: log.from.to_checksum(None),
            to: log.to.to_checksum(None),
            amount: format_amount(log.value, self.token.decimals),
            block_number: log.block_number,
            log_index: log.log_index,
        }
    }
}

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Database error: {0}")]
    Db(#[from] HistoryDbError),
}
