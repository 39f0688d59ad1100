use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers::{get_all, get_domain, post_update};
use crate::storage::StatusStore;

/// Largest accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StatusStore>,
}

impl AppState {
    pub fn new(store: Arc<StatusStore>) -> Self {
        Self { store }
    }
}

/// Routes with the default body limit.
pub fn build_router(state: AppState) -> Router {
    build_router_with_limit(state, MAX_BODY_BYTES)
}

pub fn build_router_with_limit(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(get_all))
        .route("/update", post(post_update))
        .route("/*domain", get(get_domain))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
