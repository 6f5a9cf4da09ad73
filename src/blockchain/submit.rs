// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction building, signing, submission and confirmation.
//!
//! [`Submitter`] is the single writer for the sender key. Each call to
//! [`Submitter::submit`] holds the writer lock from the nonce read until the
//! transaction is confirmed, reverted, timed out, or failed to submit, so two
//! requests in this process never race for the same nonce.
//!
//! Submission is at-most-once. A failed `eth_sendRawTransaction` is reported
//! as [`WalletError::SubmissionFailed`] and never retried: the node may have
//! accepted the transaction before the error, and resubmitting would risk a
//! duplicate transfer.

use std::sync::Arc;
use std::time::Duration;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, B256},
    rpc::types::TransactionRequest,
};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::client::{ChainClient, ChainError};
use super::error::WalletError;
use super::signing::SenderKey;
use super::types::{ChainReceipt, Receipt};

/// Reason reported when a failed transaction cannot be replayed for one.
pub(crate) const UNKNOWN_REVERT_REASON: &str = "execution reverted";

/// How long to wait for a receipt, and how often to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Signs and submits transactions from the sender key.
pub struct Submitter {
    client: Arc<dyn ChainClient>,
    wallet: EthereumWallet,
    sender: Address,
    chain_id: u64,
    policy: ConfirmationPolicy,
    writer: Mutex<()>,
}

impl Submitter {
    pub fn new(
        client: Arc<dyn ChainClient>,
        key: &SenderKey,
        chain_id: u64,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            client,
            wallet: key.wallet(),
            sender: key.address(),
            chain_id,
            policy,
            writer: Mutex::new(()),
        }
    }

    /// Address transactions are sent from.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Sign, submit and await a transaction.
    ///
    /// `call` carries the destination (or creation code) and calldata; gas,
    /// nonce and chain id are filled here.
    pub async fn submit(&self, call: TransactionRequest) -> Result<Receipt, WalletError> {
        let call = call.with_from(self.sender);

        let _writer = self.writer.lock().await;

        let gas_limit = self.client.estimate_gas(&call).await?;
        let gas_price = self.client.gas_price().await?;
        // Read last, right before signing.
        let nonce = self.client.pending_nonce(self.sender).await?;

        let request = call
            .clone()
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id);

        let envelope = request.build(&self.wallet).await.map_err(|e| {
            WalletError::SubmissionFailed(format!("Failed to sign transaction: {e}"))
        })?;
        let raw = envelope.encoded_2718();
        let local_hash = *envelope.tx_hash();

        let tx_hash = self
            .client
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| {
                tracing::warn!(tx_hash = %local_hash, nonce, error = %e, "Transaction submission failed");
                WalletError::SubmissionFailed(e.to_string())
            })?;

        tracing::info!(tx_hash = %tx_hash, nonce, gas_limit, gas_price, "Transaction submitted");

        let receipt = self.await_receipt(tx_hash).await?;

        if receipt.success {
            tracing::info!(
                tx_hash = %tx_hash,
                block_number = receipt.block_number,
                "Transaction confirmed"
            );
            return Ok(receipt.into());
        }

        let reason = self.revert_reason(&call, receipt.block_number).await;
        tracing::warn!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            reason = %reason,
            "Transaction reverted"
        );
        Err(WalletError::ExecutionReverted {
            tx_hash: Some(tx_hash),
            reason,
        })
    }

    /// Poll for the receipt until the policy's deadline.
    async fn await_receipt(&self, tx_hash: B256) -> Result<ChainReceipt, WalletError> {
        let deadline = Instant::now() + self.policy.timeout;

        loop {
            match self.client.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed, will retry");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(tx_hash = %tx_hash, "Confirmation wait timed out");
                return Err(WalletError::PendingUnconfirmed { tx_hash });
            }
            tokio::time::sleep(self.policy.poll_interval.min(deadline - now)).await;
        }
    }

    /// Replay the call against the state the failed block started from to
    /// recover the revert reason. Transactions mined earlier in the same
    /// block are not replayed, so the reason can still differ when they
    /// touched the same balances.
    async fn revert_reason(&self, call: &TransactionRequest, block_number: u64) -> String {
        let parent = block_number.saturating_sub(1);
        match self.client.replay_call(call, parent).await {
            Err(ChainError::Reverted { reason }) => reason,
            Err(e) => {
                tracing::debug!(error = %e, "Revert reason replay failed");
                UNKNOWN_REVERT_REASON.to_string()
            }
            Ok(()) => UNKNOWN_REVERT_REASON.to_string(),
        }
    }
}
