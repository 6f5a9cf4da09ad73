// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token transfer pipeline.
//!
//! `submit_transfer` runs, in order:
//!
//! 1. recipient validation (`InvalidAddress`)
//! 2. amount parsing and minimum check (`InvalidAmount`, `PrecisionLoss`)
//! 3. best-effort balance check against the sender's on-chain balance
//! 4. build, sign, submit and confirm through [`Submitter`]
//!
//! Steps 1 and 2 are local. A request that fails them never reaches the node.

use std::sync::Arc;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
};

use super::address::parse_address;
use super::amount::{format_amount, parse_amount};
use super::client::ChainClient;
use super::erc20::transfer_calldata;
use super::error::WalletError;
use super::submit::Submitter;
use super::types::{Receipt, TokenInfo};

/// Result of a confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub receipt: Receipt,
    pub recipient: Address,
    /// Smallest units sent
    pub amount_raw: U256,
    /// Display units sent
    pub amount_sent: String,
}

/// Sends SPX from the service's sender key.
pub struct TransferPipeline {
    client: Arc<dyn ChainClient>,
    submitter: Arc<Submitter>,
    token: TokenInfo,
    min_amount: U256,
}

impl TransferPipeline {
    /// `min_amount` is in smallest units; values below one unit are raised
    /// to one so that zero can never pass.
    pub fn new(
        client: Arc<dyn ChainClient>,
        submitter: Arc<Submitter>,
        token: TokenInfo,
        min_amount: U256,
    ) -> Self {
        Self {
            client,
            submitter,
            token,
            min_amount: min_amount.max(U256::from(1u64)),
        }
    }

    pub fn sender(&self) -> Address {
        self.submitter.sender()
    }

    pub fn token(&self) -> &TokenInfo {
        &self.token
    }

    /// Transfer `amount` display units to `recipient`.
    pub async fn submit_transfer(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferOutcome, WalletError> {
        let recipient = parse_address(recipient)?;
        let units = parse_amount(amount, self.token.decimals)?;

        if units < self.min_amount {
            return Err(WalletError::InvalidAmount(format!(
                "Amount is below the minimum transfer of {} {}",
                format_amount(self.min_amount, self.token.decimals),
                self.token.symbol
            )));
        }

        // The contract re-checks at execution time; this only avoids paying
        // gas for a transfer that is certain to revert.
        let balance = self
            .client
            .token_balance(self.token.contract_address, self.sender())
            .await?;
        if units > balance {
            return Err(WalletError::InvalidAmount(format!(
                "Amount exceeds sender balance of {} {}",
                format_amount(balance, self.token.decimals),
                self.token.symbol
            )));
        }

        let call = TransactionRequest::default()
            .with_to(self.token.contract_address)
            .with_input(transfer_calldata(recipient, units));

        tracing::info!(
            recipient = %recipient,
            amount = %format_amount(units, self.token.decimals),
            "Submitting token transfer"
        );

        let receipt = self.submitter.submit(call).await?;

        Ok(TransferOutcome {
            receipt,
            recipient,
            amount_raw: units,
            amount_sent: format_amount(units, self.token.decimals),
        })
    }
}
