// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory [`ChainClient`] used by the unit tests.
//!
//! Simulates one token contract on a single-sender chain: balances, the
//! sender's nonce, mined blocks, receipts and `Transfer` logs. Every trait
//! call is counted so tests can assert that local validation never reached
//! the node.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::{
    consensus::{Transaction, TxEnvelope},
    eips::eip2718::Decodable2718,
    primitives::{address, Address, TxKind, B256, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::client::{ChainClient, ChainError};
use super::erc20::IERC20;
use super::signing::{tests::DEV_KEY, SenderKey};
use super::types::{ChainReceipt, TokenInfo, TokenMetadata, TransferLog};

pub(crate) const TOKEN_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub(crate) const CHAIN_ID: u64 = 31337;
const GAS_PRICE: u128 = 1_000_000_000;
const GAS_ESTIMATE: u64 = 51_000;

#[derive(Default)]
struct State {
    head: u64,
    nonce: u64,
    balances: HashMap<Address, U256>,
    logs: Vec<TransferLog>,
    receipts: HashMap<B256, ChainReceipt>,
    submissions: usize,
    last_submitted: Option<B256>,
    offline: bool,
    hold_receipts: bool,
    fail_submissions: bool,
    /// `Some(None)` fails execution without a reason.
    fail_execution: Option<Option<String>>,
    revert_estimates: Option<String>,
    reject_estimates: Option<String>,
    omit_contract_address: bool,
    replayed_at: Option<u64>,
}

pub(crate) struct StubChain {
    key: SenderKey,
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl StubChain {
    /// Chain at block 1 where the sender holds `balance` smallest units.
    pub(crate) fn with_sender_balance(balance: U256) -> Arc<Self> {
        let key = SenderKey::from_hex(DEV_KEY).unwrap();
        let mut state = State {
            head: 1,
            ..Default::default()
        };
        state.balances.insert(key.address(), balance);

        Arc::new(Self {
            key,
            state: Mutex::new(state),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn sender_key(&self) -> SenderKey {
        self.key.clone()
    }

    pub(crate) fn sender(&self) -> Address {
        self.key.address()
    }

    pub(crate) fn chain_id_value(&self) -> u64 {
        CHAIN_ID
    }

    pub(crate) fn token_info(&self) -> TokenInfo {
        TokenInfo::new(metadata(), TOKEN_ADDRESS, CHAIN_ID)
    }

    pub(crate) fn balance_of(&self, owner: Address) -> U256 {
        self.state().balances.get(&owner).copied().unwrap_or_default()
    }

    pub(crate) fn logs(&self) -> Vec<TransferLog> {
        self.state().logs.clone()
    }

    pub(crate) fn head(&self) -> u64 {
        self.state().head
    }

    /// Number of trait calls made so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `send_raw_transaction` attempts, failed ones included.
    pub(crate) fn submissions(&self) -> usize {
        self.state().submissions
    }

    pub(crate) fn last_submitted(&self) -> Option<B256> {
        self.state().last_submitted
    }

    pub(crate) fn hold_receipts(&self, hold: bool) {
        self.state().hold_receipts = hold;
    }

    pub(crate) fn fail_execution(&self, reason: Option<&str>) {
        self.state().fail_execution = Some(reason.map(str::to_string));
    }

    pub(crate) fn revert_estimates(&self, reason: Option<&str>) {
        self.state().revert_estimates = reason.map(str::to_string);
    }

    /// Answer gas estimation with a plain RPC error, as a node does for an
    /// underfunded sender.
    pub(crate) fn reject_estimates(&self, message: Option<&str>) {
        self.state().reject_estimates = message.map(str::to_string);
    }

    /// Mine contract creations without reporting the created address.
    pub(crate) fn omit_contract_address(&self, omit: bool) {
        self.state().omit_contract_address = omit;
    }

    /// Block the last `replay_call` ran against.
    pub(crate) fn replayed_at(&self) -> Option<u64> {
        self.state().replayed_at
    }

    pub(crate) fn fail_submissions(&self, fail: bool) {
        self.state().fail_submissions = fail;
    }

    pub(crate) fn go_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Mine a block containing a mint of `amount` to `to`.
    pub(crate) fn mint(&self, to: Address, amount: U256) -> B256 {
        let mut state = self.state();
        state.head += 1;
        let block_number = state.head;
        let tx_hash = B256::from(U256::from(block_number) << 128);

        *state.balances.entry(to).or_default() += amount;
        state.logs.push(TransferLog {
            tx_hash,
            from: Address::ZERO,
            to,
            value: amount,
            block_number,
            log_index: 0,
        });
        tx_hash
    }

    pub(crate) fn advance_blocks(&self, count: u64) {
        self.state().head += count;
    }

    /// Restart the chain from genesis, as a dev node does on relaunch.
    pub(crate) fn reset_chain(&self) {
        let mut state = self.state();
        state.head = 0;
        state.nonce = 0;
        state.logs.clear();
        state.receipts.clear();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Count the call and fail if the node is offline.
    fn enter(&self) -> Result<MutexGuard<'_, State>, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if state.offline {
            return Err(ChainError::Connectivity("connection refused".to_string()));
        }
        Ok(state)
    }
}

fn metadata() -> TokenMetadata {
    TokenMetadata {
        name: "SpaceBucks".to_string(),
        symbol: "SPX".to_string(),
        decimals: 18,
    }
}

fn unknown_contract(token: Address) -> ChainError {
    ChainError::Rpc(format!("no contract at {token}"))
}

#[async_trait]
impl ChainClient for StubChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        let _state = self.enter()?;
        Ok(CHAIN_ID)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.enter()?.head)
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError> {
        let _state = self.enter()?;
        if token != TOKEN_ADDRESS {
            return Err(unknown_contract(token));
        }
        Ok(metadata())
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let state = self.enter()?;
        if token != TOKEN_ADDRESS {
            return Err(unknown_contract(token));
        }
        Ok(state.balances.get(&owner).copied().unwrap_or_default())
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64, ChainError> {
        let state = self.enter()?;
        Ok(if account == self.key.address() {
            state.nonce
        } else {
            0
        })
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        let _state = self.enter()?;
        Ok(GAS_PRICE)
    }

    async fn estimate_gas(&self, _request: &TransactionRequest) -> Result<u64, ChainError> {
        let state = self.enter()?;
        if let Some(reason) = &state.revert_estimates {
            return Err(ChainError::Reverted {
                reason: reason.clone(),
            });
        }
        if let Some(message) = &state.reject_estimates {
            return Err(ChainError::Rpc(message.clone()));
        }
        Ok(GAS_ESTIMATE)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
        let mut state = self.enter()?;
        state.submissions += 1;
        if state.fail_submissions {
            return Err(ChainError::Rpc("replacement transaction underpriced".to_string()));
        }

        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| ChainError::Rpc(format!("invalid raw transaction: {e}")))?;
        if envelope.nonce() != state.nonce {
            return Err(ChainError::Rpc(format!(
                "nonce mismatch: expected {}, got {}",
                state.nonce,
                envelope.nonce()
            )));
        }

        let tx_hash = *envelope.tx_hash();
        let sender = self.key.address();
        state.nonce += 1;
        state.last_submitted = Some(tx_hash);

        if state.hold_receipts {
            return Ok(tx_hash);
        }

        state.head += 1;
        let block_number = state.head;
        let mut receipt = ChainReceipt {
            tx_hash,
            block_number,
            success: true,
            contract_address: None,
        };

        match envelope.kind() {
            TxKind::Create => {
                if !state.omit_contract_address {
                    receipt.contract_address = Some(sender.create(envelope.nonce()));
                }
            }
            TxKind::Call(_) => {
                let call = IERC20::transferCall::abi_decode(envelope.input())
                    .map_err(|e| ChainError::Rpc(format!("unexpected calldata: {e}")))?;
                let balance = state.balances.get(&sender).copied().unwrap_or_default();

                if state.fail_execution.is_some() || call.amount > balance {
                    receipt.success = false;
                } else {
                    state.balances.insert(sender, balance - call.amount);
                    *state.balances.entry(call.to).or_default() += call.amount;
                    state.logs.push(TransferLog {
                        tx_hash,
                        from: sender,
                        to: call.to,
                        value: call.amount,
                        block_number,
                        log_index: 0,
                    });
                }
            }
        }

        state.receipts.insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ChainReceipt>, ChainError> {
        Ok(self.enter()?.receipts.get(&hash).cloned())
    }

    async fn replay_call(
        &self,
        _request: &TransactionRequest,
        block_number: u64,
    ) -> Result<(), ChainError> {
        let mut state = self.enter()?;
        state.replayed_at = Some(block_number);
        match &state.fail_execution {
            Some(Some(reason)) => Err(ChainError::Reverted {
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    async fn transfer_logs(
        &self,
        token: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferLog>, ChainError> {
        let state = self.enter()?;
        if token != TOKEN_ADDRESS {
            return Err(unknown_contract(token));
        }
        Ok(state
            .logs
            .iter()
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .cloned()
            .collect())
    }
}
