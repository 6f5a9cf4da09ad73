// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../../static/dashboard.html");

/// Serve the single-page dashboard.
#[utoipa::path(
    get,
    path = "/dapp",
    tag = "Dashboard",
    responses((status = 200, description = "Dashboard page", content_type = "text/html"))
)]
pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
