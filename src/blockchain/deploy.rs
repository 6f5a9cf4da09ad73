// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token contract deployment.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
};
use serde::Serialize;

use super::erc20::creation_code;
use super::error::WalletError;
use super::submit::Submitter;

/// Constructor arguments of the token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    /// Whole tokens minted to the deployer.
    pub supply: U256,
}

/// Record of a confirmed deployment, written out for the wallet's
/// `CONTRACT_ADDRESS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub contract_address: String,
    pub tx_hash: String,
    pub block_number: u64,
}

/// Submit the creation transaction for `bytecode` and wait for it.
pub async fn deploy_token(
    submitter: &Submitter,
    bytecode: &[u8],
    params: &TokenParams,
) -> Result<Deployment, WalletError> {
    let code = creation_code(bytecode, &params.name, &params.symbol, params.supply);
    let receipt = submitter
        .submit(TransactionRequest::default().with_deploy_code(code))
        .await?;

    let contract_address: Address = receipt.contract_address.ok_or_else(|| {
        WalletError::NodeError(format!(
            "Receipt {:#x} carries no contract address",
            receipt.tx_hash
        ))
    })?;

    tracing::info!(
        contract = %contract_address,
        block_number = receipt.block_number,
        "Token contract deployed"
    );

    Ok(Deployment {
        contract_address: contract_address.to_checksum(None),
        tx_hash: format!("{:#x}", receipt.tx_hash),
        block_number: receipt.block_number,
    })
}
