//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ocr::OcrEngine;
use crate::pool::PoolStats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub engine: &'static str,
    pub pool: PoolStats,
}

pub async fn health_check<E: OcrEngine>(State(state): State<AppState<E>>) -> Json<HealthResponse> {
    let pool = state.pool().stats();
    Json(HealthResponse {
        status: if pool.shut_down { "shutting_down" } else { "healthy" },
        version: env!("CARGO_PKG_VERSION"),
        service: "ocr-service",
        engine: state.pool().engine_name(),
        pool,
    })
}
