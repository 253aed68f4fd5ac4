use crate::{handlers::*, middleware::apply_middleware, AppState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        // Chat
        .route("/api/chat", post(chat))
        .route("/api/history", get(history))
        // Health and metrics
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
}

pub fn build_router(state: AppState) -> Router {
    let body_limit_mb = state.config.server.max_request_body_size_mb;
    apply_middleware(create_router().with_state(state), body_limit_mb)
}
