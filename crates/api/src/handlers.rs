use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::Json,
};
use laponia_metrics::TracingService;
use laponia_models::{
    ChatError, ChatResponse, ErrorShape, HealthResponse, HistoryEntry, HistoryResponse,
    HomeResponse,
};
use std::collections::HashMap;
use tracing::{error, info, instrument};

pub type ApiError = (StatusCode, Json<ErrorShape>);

pub fn api_error(e: &ChatError) -> ApiError {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_shape()),
    )
}

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "API Chatbot Laponia está funcionando!".to_string(),
        status: "healthy".to_string(),
        chatbot_initialized: state.chatbot_initialized(),
    })
}

/// Pull the `message` string out of a chat body. Anything that is not a JSON
/// object with a string `message` is rejected.
pub fn parse_chat_message(body: &[u8]) -> Result<String, ChatError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ChatError::malformed_chat_request())?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .ok_or_else(ChatError::malformed_chat_request)
}

#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let chatbot = state.chatbot().map_err(|e| {
        error!("Chat request rejected: {}", e);
        api_error(&e)
    })?;
    let message = parse_chat_message(&body).map_err(|e| api_error(&e))?;

    info!("Handling chat message ({} bytes)", message.len());
    let response = chatbot.handle(&message).await;
    Ok(Json(ChatResponse { response }))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let chatbot = state.chatbot().map_err(|e| api_error(&e))?;
    let limit = params
        .get("limit")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(state.config.chat.default_history_limit);

    let history = chatbot
        .store()
        .conversation_history(limit)
        .await
        .unwrap_or_else(|e| {
            TracingService::log_degraded("conversation_history", &e);
            Vec::new()
        })
        .into_iter()
        .map(HistoryEntry::from)
        .collect();

    Ok(Json(HistoryResponse { history }))
}

#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        chatbot_initialized: state.chatbot_initialized(),
        timestamp: chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    })
}

#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state.metrics.get_prometheus_metrics().map_err(|e| {
        error!("Failed to get metrics: {}", e);
        api_error(&e)
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorShape {
            error: format!("Not Found: {}", uri.path()),
            error_type: "NotFound".to_string(),
        }),
    )
}
