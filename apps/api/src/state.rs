use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::chat::engine::TurnEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TurnEngine>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: Arc<TurnEngine>) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}
