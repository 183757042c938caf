mod maxelpay;

pub use maxelpay::*;

use axum::{Router, routing::post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/webhook", post(handle_maxelpay_webhook))
}
