//! HTTP front end
//!
//! ```text
//! POST /{collection} ──▶ ingest_handler ──▶ Pipeline (fetch → extract → save)
//! GET  /health, /status, /metrics ──▶ AppState counters
//! ```

pub mod ingest;
pub mod status;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

pub use ingest::{collection_handler, index_handler, ingest_handler, IngestForm};
pub use status::{health_handler, metrics_handler, status_handler, AppState};

use crate::cors::cors_layer;

/// Build the complete router.
///
/// # Routes
/// - `GET /` - greeting
/// - `GET /health`, `GET /status`, `GET /metrics`
/// - `GET /{collection}` - greeting
/// - `POST /{collection}` - ingest the listing at form field `PostUrl`
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/:collection",
            get(collection_handler).post(ingest_handler),
        )
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
