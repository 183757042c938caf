mod orders;
mod payments;

pub use orders::*;
pub use payments::*;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::AppState;
use crate::extractors::Json;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/create-payment", post(create_payment))
        .route("/api/submit-order", post(submit_order))
}
