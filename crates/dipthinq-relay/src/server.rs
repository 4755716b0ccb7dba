use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};

use dipthinq_types::relay::RelayReply;

use crate::error::ApiError;
use crate::relay::Relay;

/// `POST /api/chat` (any other method gets a JSON 405) and `GET /health`.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(relay)
}

async fn chat(State(relay): State<Arc<Relay>>, body: Bytes) -> Result<Json<RelayReply>, ApiError> {
    relay.handle(&body).await.map(Json)
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
