// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Failure taxonomy of the wallet operations.

use alloy::primitives::B256;

use super::client::ChainError;

/// Errors returned by the transfer pipeline and the query service.
///
/// `InvalidAddress`, `InvalidAmount` and `PrecisionLoss` are raised before
/// any request reaches the node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount not representable in smallest units: {0}")]
    PrecisionLoss(String),

    /// The submission itself failed; whether the node accepted the
    /// transaction is unknown.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// Submitted but not confirmed within the wait bound. The transaction
    /// may still be included later.
    #[error("Transaction {tx_hash:#x} submitted but not yet confirmed")]
    PendingUnconfirmed { tx_hash: B256 },

    /// The chain rejected the operation. `tx_hash` is `None` when the revert
    /// was detected during gas estimation, before submission.
    #[error("Execution reverted: {reason}")]
    ExecutionReverted {
        tx_hash: Option<B256>,
        reason: String,
    },

    /// The node could not be reached at all.
    #[error("Cannot reach blockchain node: {0}")]
    ConnectivityError(String),

    /// The node answered but refused the request or returned data that
    /// could not be decoded. Nothing was submitted.
    #[error("Blockchain node rejected the request: {0}")]
    NodeError(String),

    /// Local history store failure.
    #[error("History storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Stable machine-readable name, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "invalid_address",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::PrecisionLoss(_) => "precision_loss",
            Self::SubmissionFailed(_) => "submission_failed",
            Self::PendingUnconfirmed { .. } => "pending_unconfirmed",
            Self::ExecutionReverted { .. } => "execution_reverted",
            Self::ConnectivityError(_) => "connectivity_error",
            Self::NodeError(_) => "node_error",
            Self::Storage(_) => "storage_error",
        }
    }
}

/// Map a node error raised before anything was submitted: reads, gas
/// estimation, gas price and nonce lookups. Only transport failures count as
/// connectivity problems.
impl From<ChainError> for WalletError {
    fn from(error: ChainError) -> Self {
        match error {
            ChainError::Reverted { reason } => Self::ExecutionReverted {
                tx_hash: None,
                reason,
            },
            ChainError::Connectivity(msg) => Self::ConnectivityError(msg),
            ChainError::Rpc(msg) | ChainError::Decode(msg) => Self::NodeError(msg),
        }
    }
}
