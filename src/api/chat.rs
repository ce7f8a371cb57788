//! Natural-language endpoint.
//!
//! `POST /api/chat` snapshots the store, interprets the message and executes
//! the resulting command. Commands naming a task that no longer exists are a
//! no-op with a `null` result.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::assistant::Command;
use crate::task::{ListFilter, TaskSnapshot};

use super::routes::AppState;
use super::task_store::StoreError;
use super::todos::store_failure;
use super::types::{ChatRequest, ChatResponse, DeleteResult};

/// POST /api/chat - Interpret a message and run the command it names.
pub(crate) async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let snapshot: Vec<TaskSnapshot> = state
        .store
        .list_tasks(ListFilter::All)
        .await
        .map_err(store_failure)?
        .iter()
        .map(TaskSnapshot::from)
        .collect();

    let command = interpret_with_timeout(&state, &req.message, &snapshot).await;
    tracing::info!(action = command.action(), "interpreted chat message");

    let result = execute(&state, &command).await.map_err(store_failure)?;
    Ok(Json(ChatResponse {
        ai_response: command,
        result,
    }))
}

/// Interpret under the configured timeout. An elapsed timeout degrades to a
/// response like any other fallback failure.
async fn interpret_with_timeout(state: &AppState, message: &str, snapshot: &[TaskSnapshot]) -> Command {
    let timeout = state.config.fallback.timeout;
    match tokio::time::timeout(timeout, state.assistant.interpret(message, snapshot)).await {
        Ok(command) => command,
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "interpretation timed out");
            Command::respond(format!(
                "I understood '{}' but it took too long to process. Please try again.",
                message.trim()
            ))
        }
    }
}

/// Run `command` against the store.
async fn execute(state: &AppState, command: &Command) -> Result<Value, StoreError> {
    let store = &state.store;
    let value = match command {
        Command::Create { .. } => match command.to_new_task() {
            Some(new_task) => to_value(store.create_task(new_task).await?),
            None => Value::Null,
        },
        Command::Update { .. } => match command.to_task_update() {
            Some((id, changes)) => store
                .update_task(id, &changes)
                .await?
                .map(to_value)
                .unwrap_or(Value::Null),
            None => Value::Null,
        },
        Command::Delete { id } => {
            if store.delete_task(*id).await? {
                to_value(DeleteResult { deleted: true, id: *id })
            } else {
                tracing::debug!(id, "delete target does not exist");
                Value::Null
            }
        }
        Command::List { filter } => to_value(store.list_tasks(*filter).await?),
        Command::Response { .. } => Value::Null,
    };
    Ok(value)
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
