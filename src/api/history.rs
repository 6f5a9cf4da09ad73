// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    blockchain::HistoryEntry,
    error::{ApiError, ErrorBody},
    state::AppState,
};

/// List every SPX transfer, newest first.
///
/// New blocks are synced into the local store before answering.
#[utoipa::path(
    get,
    path = "/history",
    tag = "History",
    responses(
        (status = 200, description = "Transfers, newest first", body = [HistoryEntry]),
        (status = 500, description = "History store failure", body = ErrorBody),
        (status = 502, description = "Blockchain node rejected the request", body = ErrorBody),
        (status = 503, description = "Blockchain node unavailable", body = ErrorBody)
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    Ok(Json(state.queries.get_history().await?))
}
