// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the pipeline, the query service and the API.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Token metadata as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Token the service is bound to, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub contract_address: Address,
    pub chain_id: u64,
}

impl TokenInfo {
    pub fn new(metadata: TokenMetadata, contract_address: Address, chain_id: u64) -> Self {
        Self {
            name: metadata.name,
            symbol: metadata.symbol,
            decimals: metadata.decimals,
            contract_address,
            chain_id,
        }
    }
}

/// Receipt as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
}

/// Confirmation record for a transaction that was included and succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
    pub contract_address: Option<Address>,
}

impl From<ChainReceipt> for Receipt {
    fn from(r: ChainReceipt) -> Self {
        Self {
            tx_hash: r.tx_hash,
            block_number: r.block_number,
            success: r.success,
            contract_address: r.contract_address,
        }
    }
}

/// A decoded `Transfer(from, to, value)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLog {
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    /// Smallest units
    pub value: U256,
    pub block_number: u64,
    pub log_index: u64,
}

/// One row of the transfer history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    /// Transaction hash
    pub tx_hash: String,
    /// Sender address (zero address for mints)
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Amount in display units
    pub amount: String,
    /// Block that included the transfer
    pub block_number: u64,
    /// Position of the event within the block
    pub log_index: u64,
}

/// Balance of one address in both unit systems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: Address,
    /// Smallest units
    pub raw: U256,
    /// Display units
    pub formatted: String,
}
