//! Wire types for the agent selector HTTP API.
//!
//! Serializable with serde for JSON over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/select`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectAgentRequest {
    /// Free-form description of the task the user needs help with
    pub task: String,
}

/// Successful selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectAgentResponse {
    /// ULID of the request session
    pub session_id: String,

    /// Model answer with surrogate tokens restored
    pub answer: String,

    /// `answer` rendered from markdown and sanitized
    pub answer_html: String,

    /// Agent document the answer was grounded on
    pub source: String,

    /// Distinct names masked before the model call
    pub masked_names: usize,

    /// Distinct phone numbers masked before the model call
    pub masked_phones: usize,

    pub completed_at: DateTime<Utc>,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
    /// Pipeline stage that failed (`input`, `corpus`, `retrieval`, `masking`, `completion`)
    pub stage: String,
}
