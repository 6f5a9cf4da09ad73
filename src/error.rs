// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::WalletError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    error: String,
    /// Machine-readable error kind
    code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }
}

impl From<WalletError> for ApiError {
    fn from(error: WalletError) -> Self {
        let status = match &error {
            WalletError::InvalidAddress(_)
            | WalletError::InvalidAmount(_)
            | WalletError::PrecisionLoss(_) => StatusCode::BAD_REQUEST,
            WalletError::ExecutionReverted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WalletError::SubmissionFailed(_) | WalletError::NodeError(_) => {
                StatusCode::BAD_GATEWAY
            }
            WalletError::PendingUnconfirmed { .. } => StatusCode::ACCEPTED,
            WalletError::ConnectivityError(_) => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
