// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the SpaceBucks token.
//!
//! This module provides functionality for:
//! - Validating addresses and converting amounts locally
//! - Talking to the EVM node through [`ChainClient`]
//! - Signing, submitting and confirming transfers ([`TransferPipeline`])
//! - Balance and history queries ([`QueryService`])
//! - Deploying the token contract ([`deploy_token`])

pub mod address;
pub mod amount;
pub mod client;
pub mod deploy;
pub mod erc20;
pub mod error;
pub mod query;
pub mod signing;
pub mod submit;
pub mod transfer;
pub mod types;

#[cfg(test)]
pub(crate) mod stub;

pub use address::parse_address;
pub use amount::{format_amount, parse_amount};
pub use client::{AlloyChainClient, ChainClient, ChainError};
pub use deploy::{deploy_token, Deployment, TokenParams};
pub use error::WalletError;
pub use query::QueryService;
pub use signing::{KeyError, SenderKey};
pub use submit::{ConfirmationPolicy, Submitter};
pub use transfer::{TransferOutcome, TransferPipeline};
pub use types::*;
