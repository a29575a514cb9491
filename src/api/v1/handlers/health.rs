/*
 * Responsibility
 * - GET /health (liveness)
 * - CORS-open: registered on the allow-list by routes.rs
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
