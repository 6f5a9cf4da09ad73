// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the EVM node answers ("ok" or "unreachable").
    pub node: String,
    /// Current chain head, when the node answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the node answers a block number request.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let head = state.client.block_number().await;

    let (status, node, block_number) = match head {
        Ok(n) => (StatusCode::OK, "ok", Some(n)),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check: node unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable", None)
        }
    };

    let response = ReadyResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            node: node.to_string(),
            block_number,
        },
    };

    (status, Json(response))
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
    async fn liveness_ignores_node() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);
        stub.go_offline(true);

        let response = send(&state, Request::get("/health/live").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reports_head() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);

        let response = send(&state, Request::get("/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["node"], "ok");
        assert_eq!(body["checks"]["block_number"], stub.head());
    }

    #[tokio::test]
    async fn readiness_fails_when_node_is_down() {
        let stub = StubChain::with_sender_balance(spx(1));
        let (state, _dir) = state(&stub);
        stub.go_offline(true);

        let response = send(&state, Request::get("/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["node"], "unreachable");
    }
}
