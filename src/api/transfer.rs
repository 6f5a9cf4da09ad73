// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token transfer endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    blockchain::{format_amount, parse_address, parse_amount, WalletError},
    error::{ApiError, ErrorBody},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Amount as sent by clients: either a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    /// Decimal text of the amount.
    ///
    /// JSON numbers reach us already parsed into `u64`/`i64`/`f64`, so only
    /// integers survive exactly. Fractional or out-of-range numbers are
    /// rejected rather than sent as whatever `f64` rounded them to.
    pub fn as_text(&self) -> Result<String, WalletError> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
            Self::Number(n) => Err(WalletError::InvalidAmount(format!(
                "Numeric amount {n} cannot be represented exactly; send it as a string"
            ))),
        }
    }
}

/// Request to send SPX from the service wallet.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Recipient address (0x + 40 hex chars)
    #[serde(alias = "to_address")]
    pub recipient: String,
    /// Amount in display units, as a string ("1.5") or a whole number (30)
    #[schema(value_type = String, example = "30")]
    pub amount: RawAmount,
}

/// Transfer outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    /// "success" once confirmed, "pending" if the confirmation wait ran out
    pub status: String,
    pub tx_hash: String,
    /// Display units actually sent
    pub amount_sent: String,
    pub recipient: String,
    /// Confirming block, absent while pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

// =============================================================================
// Handler
// =============================================================================

/// Send SPX from the service wallet to `recipient`.
///
/// Returns 200 once the transfer is confirmed. If the node has not
/// confirmed it within the configured wait, returns 202 with the
/// transaction hash; the transfer may still be mined later.
#[utoipa::path(
    post,
    path = "/transfer",
    tag = "Transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer confirmed", body = TransferResponse),
        (status = 202, description = "Submitted, not yet confirmed", body = TransferResponse),
        (status = 400, description = "Invalid recipient or amount", body = ErrorBody),
        (status = 422, description = "Execution reverted", body = ErrorBody),
        (status = 502, description = "Submission failed or rejected by the node", body = ErrorBody),
        (status = 503, description = "Blockchain node unavailable", body = ErrorBody)
    )
)]
pub async fn submit_transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let amount = request.amount.as_text()?;

    match state
        .transfers
        .submit_transfer(&request.recipient, &amount)
        .await
    {
        Ok(outcome) => Ok((
            StatusCode::OK,
            Json(TransferResponse {
                status: "success".to_string(),
                tx_hash: format!("{:#x}", outcome.receipt.tx_hash),
                amount_sent: outcome.amount_sent,
                recipient: outcome.recipient.to_checksum(None),
                block_number: Some(outcome.receipt.block_number),
            }),
        )),
        Err(WalletError::PendingUnconfirmed { tx_hash }) => {
            // Both inputs passed validation before submission.
            let decimals = state.token().decimals;
            let amount_sent = parse_amount(&amount, decimals)
                .map(|units| format_amount(units, decimals))
                .unwrap_or(amount);
            let recipient = parse_address(&request.recipient)
                .map(|a| a.to_checksum(None))
                .unwrap_or(request.recipient);

            Ok((
                StatusCode::ACCEPTED,
                Json(TransferResponse {
                    status: "pending".to_string(),
                    tx_hash: format!("{tx_hash:#x}"),
                    amount_sent,
                    recipient,
                    block_number: None,
                }),
            ))
        }
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "Transfer failed");
            Err(e.into())
        }
    }
}
