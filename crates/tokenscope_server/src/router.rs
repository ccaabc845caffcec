use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use engine_logging::engine_debug;
use serde_json::{json, Value};
use tokenscope_engine::{TokenRequest, TokenResult, COUNT_TOKENS_PATH};

use crate::error::ApiError;
use crate::state::AppState;

pub const HEALTH_PATH: &str = "/api/health";

/// Routes for the count endpoint and a liveness probe.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(COUNT_TOKENS_PATH, post(count_tokens))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

async fn count_tokens(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    engine_debug!("POST {} visualize={}", COUNT_TOKENS_PATH, request.visualize);
    let result = state.service.count(request).await?;
    Ok(Json(result))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
