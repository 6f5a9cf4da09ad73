// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token balance query endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ErrorBody},
    state::AppState,
};

/// Balance response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Queried address (checksummed)
    pub address: String,
    /// Balance in display units (e.g. "70" or "0.5")
    pub balance: String,
    /// Balance in smallest units
    pub balance_raw: String,
    /// Token symbol
    pub symbol: String,
}

/// Get the SPX balance of an address.
///
/// The address is validated locally; a malformed one is rejected without
/// querying the node.
#[utoipa::path(
    get,
    path = "/balance/{address}",
    tag = "Token",
    params(
        ("address" = String, Path, description = "0x-prefixed address, 42 characters")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Invalid address", body = ErrorBody),
        (status = 502, description = "Blockchain node rejected the request", body = ErrorBody),
        (status = 503, description = "Blockchain node unavailable", body = ErrorBody)
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.queries.get_balance(&address).await?;

    Ok(Json(BalanceResponse {
        address: balance.address.to_checksum(None),
        balance: balance.formatted,
        balance_raw: balance.raw.to_string(),
        symbol: state.token().symbol.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::blockchain::stub::StubChain;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    #[tokio::test]
    async fn balance_of_sender() {
        let stub = StubChain::with_sender_balance(spx(100));
        let (state, _dir) = state(&stub);
        let sender = stub.sender().to_checksum(None);

        let response = send(
            &state,
            Request::get(format!("/balance/{sender}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["address"], sender);
        assert_eq!(body["balance"], "100");
        assert_eq!(body["balance_raw"], spx(100).to_string());
        assert_eq!(body["symbol"], "SPX");
    }

    #[tokio::test]
    async fn short_address_is_bad_request() {
        let stub = StubChain::with_sender_balance(spx(100));
        let (state, _dir) = state(&stub);
        let calls = stub.calls();

        let short = "0x70997970C51812dc3A010C7d01b50e0d17dc79C";
        assert_eq!(short.len(), 41);
        let response = send(
            &state,
            Request::get(format!("/balance/{short}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_address");
        assert_eq!(stub.calls(), calls);
    }

    #[tokio::test]
    async fn offline_node_is_service_unavailable() {
        let stub = StubChain::with_sender_balance(spx(100));
        let (state, _dir) = state(&stub);
        stub.go_offline(true);

        let sender = stub.sender().to_checksum(None);
        let response = send(
            &state,
            Request::get(format!("/balance/{sender}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["code"], "connectivity_error");
    }
}
