pub mod errors;
pub mod handlers;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/convert", get(handlers::convert))
        .route("/healthz", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
