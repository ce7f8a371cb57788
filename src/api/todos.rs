//! Todo CRUD endpoints.
//!
//! - `GET /api/todos?filter=all|pending|completed` - List todos
//! - `POST /api/todos` - Create a todo
//! - `GET /api/todos/:id` - Get one todo
//! - `PUT /api/todos/:id` - Partially update a todo
//! - `DELETE /api/todos/:id` - Delete a todo

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::task::{NewTask, Task, TaskId, TaskUpdate};

use super::routes::AppState;
use super::task_store::StoreError;
use super::types::ListQuery;

/// Create todo routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/:id", get(get_todo).put(update_todo).delete(delete_todo))
}

/// Log a store failure and map it to a 500.
pub(crate) fn store_failure(e: StoreError) -> (StatusCode, String) {
    tracing::error!(error = %e, "task store failure");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found(id: TaskId) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Todo {} not found", id))
}

/// GET /api/todos - List todos, optionally filtered by status.
pub(crate) async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state
        .store
        .list_tasks(query.filter)
        .await
        .map_err(store_failure)?;
    Ok(Json(tasks))
}

/// POST /api/todos - Create a todo.
pub(crate) async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title cannot be empty".to_string()));
    }

    let task = state.store.create_task(req).await.map_err(store_failure)?;
    tracing::info!(id = task.id, title = %task.title, "created todo");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/todos/:id - Get one todo.
pub(crate) async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state
        .store
        .get_task(id)
        .await
        .map_err(store_failure)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/todos/:id - Apply a partial update.
pub(crate) async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    Json(changes): Json<TaskUpdate>,
) -> Result<Json<Task>, (StatusCode, String)> {
    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err((StatusCode::BAD_REQUEST, "Title cannot be empty".to_string()));
    }

    let task = state
        .store
        .update_task(id, &changes)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, "updated todo");
    Ok(Json(task))
}

/// DELETE /api/todos/:id - Delete a todo.
pub(crate) async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.delete_task(id).await.map_err(store_failure)? {
        tracing::info!(id, "deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_state;
    use crate::task::{ListFilter, Priority};

    #[tokio::test]
    async fn test_create_and_get() {
        let state = test_state();
        let (status, Json(task)) = create_todo(
            State(state.clone()),
            Json(NewTask::new("  Buy groceries ").with_priority(Priority::High)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task.title, "Buy groceries");

        let Json(fetched) = get_todo(State(state), Path(task.id)).await.unwrap();
        assert_eq!(fetched, task);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let state = test_state();
        let err = create_todo(State(state.clone()), Json(NewTask::new("   ")))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let created = state.store.create_task(NewTask::new("Read book")).await.unwrap();
        let blank = TaskUpdate {
            title: Some(" ".to_string()),
            ..TaskUpdate::default()
        };
        let err = update_todo(State(state), Path(created.id), Json(blank))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_ids_are_404() {
        let state = test_state();
        assert_eq!(
            get_todo(State(state.clone()), Path(9)).await.unwrap_err().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            update_todo(State(state.clone()), Path(9), Json(TaskUpdate::complete()))
                .await
                .unwrap_err()
                .0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            delete_todo(State(state), Path(9)).await.unwrap_err().0,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_update_delete_and_filter() {
        let state = test_state();
        let first = state.store.create_task(NewTask::new("Exercise")).await.unwrap();
        let second = state.store.create_task(NewTask::new("Read book")).await.unwrap();

        let Json(updated) = update_todo(
            State(state.clone()),
            Path(first.id),
            Json(TaskUpdate::complete()),
        )
        .await
        .unwrap();
        assert!(updated.completed);

        let Json(pending) = list_todos(
            State(state.clone()),
            Query(ListQuery {
                filter: ListFilter::Pending,
            }),
        )
        .await
        .unwrap();
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![second.id]);

        let status = delete_todo(State(state.clone()), Path(second.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(all) = list_todos(State(state), Query(ListQuery::default())).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
