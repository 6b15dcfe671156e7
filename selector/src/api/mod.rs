//! HTTP surface: the single-page form, the selection endpoint, and health.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub mod page;
pub mod select;

use crate::pipeline::AgentSelector;

#[derive(Clone)]
pub struct ApiState {
    pub selector: Arc<AgentSelector>,
}

/// Configure all routes
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(health_check))
        .route("/api/select", post(select::select_agent))
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "agent-selector",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
