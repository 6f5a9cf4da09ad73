// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Service status and the token it is bound to.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always "online" when the server answers
    pub status: String,
    /// Token name
    pub token: String,
    pub symbol: String,
    pub decimals: u8,
    pub contract_address: String,
    pub chain_id: u64,
}

/// Report that the API is up, with the token metadata read at startup.
///
/// The dashboard calls this on load to decide whether the API is reachable.
#[utoipa::path(
    get,
    path = "/",
    tag = "Token",
    responses((status = 200, description = "Service is online", body = StatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let token = state.token();
    Json(StatusResponse {
        status: "online".to_string(),
        token: token.name.clone(),
        symbol: token.symbol.clone(),
        decimals: token.decimals,
        contract_address: token.contract_address.to_checksum(None),
        chain_id: token.chain_id,
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::blockchain::stub::{StubChain, CHAIN_ID, TOKEN_ADDRESS};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    #[tokio::test]
    async fn status_reports_token() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);
        let calls = stub.calls();

        let response = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["token"], "SpaceBucks");
        assert_eq!(body["symbol"], "SPX");
        assert_eq!(body["decimals"], 18);
        assert_eq!(body["contract_address"], TOKEN_ADDRESS.to_checksum(None));
        assert_eq!(body["chain_id"], CHAIN_ID);

        // served from startup metadata
        assert_eq!(stub.calls(), calls);
    }
}
