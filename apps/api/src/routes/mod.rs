pub mod health;
pub mod widget;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(widget::widget_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/chat", post(handlers::handle_chat))
        .route("/api/v1/profile", get(handlers::handle_profile))
        .with_state(state)
}
