//! SQLite-based task store.

use super::{StoreError, TaskStore};
use crate::task::{ListFilter, NewTask, Priority, Task, TaskId, TaskUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    priority TEXT NOT NULL DEFAULT 'medium',
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, completed, priority, due_date, created_at, updated_at FROM todos";

/// Raw column values, converted to a `Task` outside the rusqlite row callback.
type TaskRow = (
    i64,
    String,
    Option<String>,
    bool,
    String,
    Option<String>,
    String,
    String,
);

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            tracing::info!("Opened task database at {}", db_path.display());
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn select_one(conn: &Connection, id: TaskId) -> Result<Option<Task>, StoreError> {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            Self::read_row,
        )
        .optional()?
        .map(into_task)
        .transpose()
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidValue {
            field,
            value: value.to_string(),
        })
}

fn into_task(row: TaskRow) -> Result<Task, StoreError> {
    let (id, title, description, completed, priority, due_date, created_at, updated_at) = row;
    let priority: Priority = priority.parse().map_err(|_| StoreError::InvalidValue {
        field: "priority",
        value: priority.clone(),
    })?;
    Ok(Task {
        id,
        title,
        description,
        completed,
        priority,
        due_date: due_date
            .as_deref()
            .map(|d| parse_time("due_date", d))
            .transpose()?,
        created_at: parse_time("created_at", &created_at)?,
        updated_at: parse_time("updated_at", &updated_at)?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_tasks(&self, filter: ListFilter) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<Task>, StoreError> {
            let conn = conn.blocking_lock();
            let sql = match filter {
                ListFilter::All => format!("{} ORDER BY id ASC", SELECT_COLUMNS),
                ListFilter::Pending => format!("{} WHERE completed = 0 ORDER BY id ASC", SELECT_COLUMNS),
                ListFilter::Completed => {
                    format!("{} WHERE completed = 1 ORDER BY id ASC", SELECT_COLUMNS)
                }
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], Self::read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(into_task).collect()
        })
        .await?
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<Task>, StoreError> {
            let conn = conn.blocking_lock();
            Self::select_one(&conn, id)
        })
        .await?
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Task, StoreError> {
            let conn = conn.blocking_lock();
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO todos (title, description, completed, priority, due_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    task.title,
                    task.description,
                    task.completed,
                    task.priority.as_str(),
                    task.due_date.map(|d| d.to_rfc3339()),
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            Self::select_one(&conn, id)?.ok_or(StoreError::Database(
                rusqlite::Error::QueryReturnedNoRows,
            ))
        })
        .await?
    }

    async fn update_task(
        &self,
        id: TaskId,
        changes: &TaskUpdate,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let changes = changes.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<Task>, StoreError> {
            let conn = conn.blocking_lock();
            let Some(mut task) = Self::select_one(&conn, id)? else {
                return Ok(None);
            };
            task.apply(&changes);
            task.updated_at = Utc::now();
            conn.execute(
                "UPDATE todos
                 SET title = ?2, description = ?3, completed = ?4, priority = ?5,
                     due_date = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.completed,
                    task.priority.as_str(),
                    task.due_date.map(|d| d.to_rfc3339()),
                    task.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(Some(task))
        })
        .await?
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let conn = conn.blocking_lock();
            let deleted = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await?
    }

    async fn count_tasks(&self) -> Result<usize, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<usize, StoreError> {
            let conn = conn.blocking_lock();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await?
    }
}
