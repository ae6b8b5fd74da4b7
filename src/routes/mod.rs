//! Route modules for the OCR Service

pub mod extract;
pub mod health;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ocr::OcrEngine;
use crate::state::AppState;

/// Build the full application router
pub fn app<E: OcrEngine>(state: AppState<E>) -> Router {
    let max_upload_bytes = state.config().upload.max_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check::<E>))
        .route("/api/v1/health", get(health::health_check::<E>))
        .merge(extract::router::<E>(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
