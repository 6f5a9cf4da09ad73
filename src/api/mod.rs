// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{blockchain::HistoryEntry, error::ErrorBody, state::AppState};

pub mod balance;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod status;
pub mod transfer;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(status::status))
        .route("/balance/{address}", get(balance::get_balance))
        .route("/transfer", post(transfer::submit_transfer))
        .route("/history", get(history::get_history))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/dapp", get(dashboard::dashboard))
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "SpaceBucks Wallet", description = "Balance, transfer and history of the SPX token"),
    paths(
        status::status,
        balance::get_balance,
        transfer::submit_transfer,
        history::get_history,
        health::liveness,
        health::readiness,
        dashboard::dashboard
    ),
    components(
        schemas(
            status::StatusResponse,
            balance::BalanceResponse,
            transfer::TransferRequest,
            transfer::TransferResponse,
            HistoryEntry,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            ErrorBody
        )
    ),
    tags(
        (name = "Token", description = "Token status and balances"),
        (name = "Transfers", description = "Sending SPX from the service wallet"),
        (name = "History", description = "Transfer history"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Dashboard", description = "Browser dashboard")
    )
)]
struct ApiDoc;


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::blockchain::stub::StubChain;
    use axum::{body::Body, http::{Request, StatusCode}};

    #[tokio::test]
    async fn openapi_document_is_served() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);

        let response = send(
            &state,
            Request::get("/api-doc/openapi.json").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        assert!(doc["paths"]["/transfer"]["post"].is_object());
        assert!(doc["paths"]["/balance/{address}"]["get"].is_object());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);

        let response = send(&state, Request::get("/health/live").body(Body::empty()).unwrap()).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
