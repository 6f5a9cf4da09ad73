// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SpaceBucks Wallet - SPX token wallet service for a local EVM node
//!
//! Reads balances, sends transfers from a single service key and serves the
//! token's transfer history, all against one deployed ERC-20 contract.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum), OpenAPI document and dashboard
//! - `blockchain` - Chain client adapter, transfer pipeline, query service
//! - `config` - Environment configuration
//! - `indexer` - Incremental `Transfer` log sync into the history store
//! - `storage` - History store (redb)
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod indexer;
pub mod state;
pub mod storage;
pub mod telemetry;
