// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::{ChainClient, QueryService, TokenInfo, TransferPipeline};

#[derive(Clone)]
pub struct AppState {
    pub transfers: Arc<TransferPipeline>,
    pub queries: Arc<QueryService>,
    /// Used directly only by the readiness probe.
    pub client: Arc<dyn ChainClient>,
}

impl AppState {
    pub fn new(
        transfers: Arc<TransferPipeline>,
        queries: Arc<QueryService>,
        client: Arc<dyn ChainClient>,
    ) -> Self {
        Self {
            transfers,
            queries,
            client,
        }
    }

    pub fn token(&self) -> &TokenInfo {
        self.queries.token_info()
    }
}
