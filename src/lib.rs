pub mod cart;
pub mod catalog;
pub mod config;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod state;
pub mod storage;
pub mod util;

use axum::{Router, extract::DefaultBodyLimit, http::Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Request bodies above this size are rejected before reaching a handler.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(handlers::public::router())
        .merge(handlers::catalog::router())
        .merge(handlers::cart::router())
        .merge(handlers::webhooks::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
