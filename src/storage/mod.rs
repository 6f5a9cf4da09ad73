// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Local Storage
//!
//! The service keeps one piece of local state: the transfer history read
//! from the chain, so `/history` does not rescan from genesis on every call.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   history.redb    # Transfer events + scan cursor
//! ```
//!
//! The store is a cache of on-chain data. Deleting it is always safe; the
//! next sync rebuilds it from block 0.

pub mod history_db;

pub use history_db::{HistoryDb, HistoryDbError, HistoryDbResult};

/// File name of the history database under the data directory.
pub const HISTORY_DB_FILE: &str = "history.redb";
