//! Core todo record and the shapes used to create, change and snapshot it.
//!
//! # Invariants
//! - `id` is assigned by the store, unique and never reused
//! - `title` is non-empty after trimming

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Task priority. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Which tasks a listing should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl ListFilter {
    /// Whether a task with the given completion state passes this filter.
    pub fn admits(&self, completed: bool) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Pending => !completed,
            ListFilter::Completed => completed,
        }
    }
}

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Apply a partial update in place. Does not touch `updated_at`.
    pub fn apply(&mut self, changes: &TaskUpdate) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
    }
}

/// Fields for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `due_date` is tri-state: absent keeps the stored value, `null` clears it,
/// a timestamp replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    /// Update that only marks a task as done.
    pub fn complete() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Maps a present field (including `null`) to `Some`, so that `#[serde(default)]`
/// alone distinguishes "absent" from "explicitly null".
pub(crate) fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Read-only view of a task handed to the assistant for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
}

impl TaskSnapshot {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            priority: Priority::Medium,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            completed: task.completed,
            priority: task.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        let task: NewTask = serde_json::from_str(r#"{"title": "Read book"}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_update_due_date_is_tristate() {
        let absent: TaskUpdate = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(absent.due_date, None);

        let cleared: TaskUpdate = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: TaskUpdate =
            serde_json::from_str(r#"{"due_date": "2026-01-02T03:04:05Z"}"#).unwrap();
        assert!(matches!(set.due_date, Some(Some(_))));
    }

    #[test]
    fn test_list_filter_admits() {
        assert!(ListFilter::All.admits(true));
        assert!(ListFilter::Pending.admits(false));
        assert!(!ListFilter::Pending.admits(true));
        assert!(ListFilter::Completed.admits(true));
    }
}
