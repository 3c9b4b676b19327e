pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::quotation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/quotations/render",
            post(handlers::handle_render),
        )
        .route(
            "/api/v1/quotations/preview",
            post(handlers::handle_preview),
        )
        .with_state(state)
}
