// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only balance and history queries.

use std::sync::Arc;

use super::address::parse_address;
use super::amount::format_amount;
use super::client::ChainClient;
use super::error::WalletError;
use super::types::{Balance, HistoryEntry, TokenInfo};
use crate::indexer::{HistoryIndexer, IndexerError};

/// Answers balance and history questions about the token.
pub struct QueryService {
    client: Arc<dyn ChainClient>,
    token: TokenInfo,
    history: Arc<HistoryIndexer>,
}

impl QueryService {
    pub fn new(client: Arc<dyn ChainClient>, token: TokenInfo, history: Arc<HistoryIndexer>) -> Self {
        Self {
            client,
            token,
            history,
        }
    }

    /// Token metadata read at startup.
    pub fn token_info(&self) -> &TokenInfo {
        &self.token
    }

    /// Token balance of `address`.
    pub async fn get_balance(&self, address: &str) -> Result<Balance, WalletError> {
        let address = parse_address(address)?;
        let raw = self
            .client
            .token_balance(self.token.contract_address, address)
            .await?;

        Ok(Balance {
            address,
            raw,
            formatted: format_amount(raw, self.token.decimals),
        })
    }

    /// Every `Transfer` of the token up to the current head, newest first.
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>, WalletError> {
        self.history.sync_once().await.map_err(history_error)?;
        self.history.entries().map_err(history_error)
    }
}

fn history_error(error: IndexerError) -> WalletError {
    match error {
        IndexerError::Chain(e) => e.into(),
        IndexerError::Db(e) => {
            tracing::error!(error = %e, "History store failure");
            WalletError::Storage(e.to_string())
        }
    }
}
