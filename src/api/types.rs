//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::assistant::Command;
use crate::task::{ListFilter, TaskId};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Task store backend ("memory" or "sqlite")
    pub store: String,

    /// Whether unmatched chat messages are forwarded to a hosted model
    pub fallback_enabled: bool,
}

/// Query string for `GET /api/todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: ListFilter,
}

/// Request to interpret a chat message. A missing message reads as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// The interpreted command and what executing it produced.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub ai_response: Command,
    /// Created/updated task, task list, deletion marker, or `null`.
    pub result: serde_json::Value,
}

/// Result of a chat-driven delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
    pub id: TaskId,
}
