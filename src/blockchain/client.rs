// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for the local EVM node.
//!
//! Every call the service makes against the node goes through the
//! [`ChainClient`] trait. The trait carries no business rules: each method is
//! a single passthrough to the node, which lets the transfer pipeline and the
//! query service run against [`AlloyChainClient`] in production and against
//! an in-memory stub in tests.

use async_trait::async_trait;

use alloy::{
    eips::BlockId,
    network::Ethereum,
    primitives::{Address, B256, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{Filter, TransactionRequest},
    sol_types::{decode_revert_reason, SolEvent},
    transports::{RpcError, TransportError},
};

use super::erc20::IERC20;
use super::types::{ChainReceipt, TokenMetadata, TransferLog};

/// HTTP provider type for the node (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Node operations used by the wallet service.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Read `name()`, `symbol()` and `decimals()` from a token contract.
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError>;

    /// `balanceOf(owner)` in smallest units.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    /// Transaction count of `account` including transactions still in the pool.
    async fn pending_nonce(&self, account: Address) -> Result<u64, ChainError>;

    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Returns [`ChainError::Reverted`] when the node reports that the call
    /// would revert.
    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError>;

    /// `None` while the transaction has not been included in a block.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ChainReceipt>, ChainError>;

    /// Re-execute `request` as a call against the state at `block_number`.
    async fn replay_call(
        &self,
        request: &TransactionRequest,
        block_number: u64,
    ) -> Result<(), ChainError>;

    /// `Transfer` events emitted by `token` within `[from_block, to_block]`.
    async fn transfer_logs(
        &self,
        token: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferLog>, ChainError>;
}

/// [`ChainClient`] backed by an alloy HTTP provider.
pub struct AlloyChainClient {
    provider: HttpProvider,
}

impl AlloyChainClient {
    /// Create a client for the node at `rpc_url`. No request is made until
    /// the first call.
    pub fn connect(rpc_url: url::Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url);
        Self { provider }
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider.get_chain_id().await.map_err(classify)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(classify)
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError> {
        let contract = IERC20::new(token, self.provider.clone());

        let name = contract.name().call().await.map_err(contract_error)?;
        let symbol = contract.symbol().call().await.map_err(contract_error)?;
        let decimals = contract.decimals().call().await.map_err(contract_error)?;

        Ok(TokenMetadata {
            name,
            symbol,
            decimals,
        })
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let contract = IERC20::new(token, self.provider.clone());
        let balance: U256 = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(balance)
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(account)
            .block_id(BlockId::pending())
            .await
            .map_err(classify)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider.get_gas_price().await.map_err(classify)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError> {
        self.provider
            .estimate_gas(request.clone())
            .await
            .map_err(classify)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ChainReceipt>, ChainError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(classify)?;

        Ok(receipt.map(|r| ChainReceipt {
            tx_hash: r.transaction_hash,
            block_number: r.block_number.unwrap_or(0),
            success: r.status(),
            contract_address: r.contract_address,
        }))
    }

    async fn replay_call(
        &self,
        request: &TransactionRequest,
        block_number: u64,
    ) -> Result<(), ChainError> {
        self.provider
            .call(request.clone())
            .block(BlockId::number(block_number))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn transfer_logs(
        &self,
        token: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferLog>, ChainError> {
        let filter = Filter::new()
            .address(token)
            .event_signature(IERC20::Transfer::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self.provider.get_logs(&filter).await.map_err(classify)?;

        let mut transfers = Vec::with_capacity(logs.len());
        for log in logs {
            let decoded = log
                .log_decode::<IERC20::Transfer>()
                .map_err(|e| ChainError::Decode(e.to_string()))?;

            // Pending logs carry no position; only mined ones are history.
            let (Some(tx_hash), Some(block_number)) = (log.transaction_hash, log.block_number)
            else {
                continue;
            };

            let event = decoded.inner.data;
            transfers.push(TransferLog {
                tx_hash,
                from: event.from,
                to: event.to,
                value: event.value,
                block_number,
                log_index: log.log_index.unwrap_or(0),
            });
        }

        Ok(transfers)
    }
}

/// Sort a transport error into connectivity, revert, or other node errors.
fn classify(error: TransportError) -> ChainError {
    match error {
        RpcError::Transport(kind) => ChainError::Connectivity(kind.to_string()),
        RpcError::ErrorResp(payload) => {
            if is_revert_message(&payload.message) {
                let reason = payload
                    .as_revert_data()
                    .and_then(|data| decode_revert_reason(&data))
                    .unwrap_or_else(|| revert_reason_from_message(&payload.message));
                ChainError::Reverted { reason }
            } else {
                ChainError::Rpc(payload.message.to_string())
            }
        }
        other => ChainError::Rpc(other.to_string()),
    }
}

fn contract_error(error: alloy::contract::Error) -> ChainError {
    match error {
        alloy::contract::Error::TransportError(e) => classify(e),
        other => ChainError::Rpc(other.to_string()),
    }
}

fn is_revert_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}

/// Extract the human reason from a node's revert message.
///
/// geth/anvil: `execution reverted: <reason>`,
/// ganache: `VM Exception while processing transaction: revert <reason>`.
pub fn revert_reason_from_message(message: &str) -> String {
    const PREFIXES: [&str; 3] = [
        "execution reverted: ",
        "VM Exception while processing transaction: revert ",
        "VM Exception while processing transaction: reverted with reason string ",
    ];

    for prefix in PREFIXES {
        if let Some(reason) = message.strip_prefix(prefix) {
            let reason = reason.trim().trim_matches('\'');
            if !reason.is_empty() {
                return reason.to_string();
            }
        }
    }

    message.trim().to_string()
}

/// Errors that can occur while talking to the node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The node could not be reached at all.
    #[error("Node unreachable: {0}")]
    Connectivity(String),

    #[error("Execution reverted: {reason}")]
    Reverted { reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Decode error: {0}")]
    Decode(String),
}
