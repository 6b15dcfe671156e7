use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use shared_types::{ApiError, SelectAgentRequest, SelectAgentResponse};

use super::ApiState;
use crate::markdown;
use crate::pipeline::SelectorError;

/// `POST /api/select` - run one selection and return the restored answer.
pub async fn select_agent(
    State(state): State<ApiState>,
    Json(req): Json<SelectAgentRequest>,
) -> Response {
    match state.selector.select(&req.task).await {
        Ok(selection) => {
            let (masked_names, masked_phones) = selection.masked_fields;
            let response = SelectAgentResponse {
                session_id: selection.session_id.to_string(),
                answer_html: markdown::render_to_html(&selection.answer),
                answer: selection.answer,
                source: selection.source.display().to_string(),
                masked_names,
                masked_phones,
                completed_at: Utc::now(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &SelectorError) -> Response {
    let (status, error) = match err {
        SelectorError::EmptyTask => (
            StatusCode::BAD_REQUEST,
            "Enter a task description first".to_string(),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error running QA chain: {other}"),
        ),
    };
    let body = ApiError {
        error,
        stage: err.stage().to_string(),
    };
    (status, Json(body)).into_response()
}
