//! HTTP endpoint handlers. Gameplay happens over `/ws`; these are read-only status endpoints.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_banks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let banks = state.bank_summary();
    info!(target: "chemboard", count = banks.len(), "HTTP banks served");
    Json(BanksOut { banks })
}
