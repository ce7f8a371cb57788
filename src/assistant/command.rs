//! The structured command produced by the assistant.
//!
//! Serialized with an `action` discriminator, e.g.
//! `{"action":"update","id":1,"completed":true}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{present_or_null, ListFilter, NewTask, Priority, TaskId, TaskUpdate};

/// Help text listing the phrasings the rule cascade understands.
pub const HELP_MESSAGE: &str = "Hello! I can help you manage your todos. Try saying:\n\
• 'Add buy groceries'\n\
• 'Complete task 1'\n\
• 'Show all tasks'\n\
• 'Delete task 2'\n\
• 'Add urgent meeting with high priority'";

/// One interpreted user request. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    Create {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        priority: Priority,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        due_date: Option<DateTime<Utc>>,
    },
    Update {
        id: TaskId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
        #[serde(
            default,
            deserialize_with = "present_or_null",
            skip_serializing_if = "Option::is_none"
        )]
        due_date: Option<Option<DateTime<Utc>>>,
    },
    Delete {
        id: TaskId,
    },
    List {
        #[serde(default)]
        filter: ListFilter,
    },
    Response {
        message: String,
    },
}

impl Command {
    pub fn create(title: impl Into<String>, priority: Priority) -> Self {
        Command::Create {
            title: title.into(),
            description: String::new(),
            priority,
            due_date: None,
        }
    }

    /// Mark a task as done.
    pub fn complete(id: TaskId) -> Self {
        Command::Update {
            id,
            title: None,
            description: None,
            completed: Some(true),
            priority: None,
            due_date: None,
        }
    }

    pub fn delete(id: TaskId) -> Self {
        Command::Delete { id }
    }

    pub fn list(filter: ListFilter) -> Self {
        Command::List { filter }
    }

    pub fn respond(message: impl Into<String>) -> Self {
        Command::Response {
            message: message.into(),
        }
    }

    pub fn help() -> Self {
        Self::respond(HELP_MESSAGE)
    }

    /// Value of the `action` discriminator.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::List { .. } => "list",
            Command::Response { .. } => "response",
        }
    }

    /// Whether the command can be executed as-is. Deserialization already
    /// guarantees required fields are present; this rejects values that are
    /// present but unusable, and updates that change nothing.
    pub fn is_actionable(&self) -> bool {
        match self {
            Command::Create { title, .. } => !title.trim().is_empty(),
            Command::Update { id, .. } => {
                *id > 0
                    && self
                        .to_task_update()
                        .is_some_and(|(_, changes)| !changes.is_empty())
            }
            Command::Delete { id } => *id > 0,
            Command::List { .. } => true,
            Command::Response { message } => !message.trim().is_empty(),
        }
    }

    /// Fields for the store when this is a `Create`.
    pub fn to_new_task(&self) -> Option<NewTask> {
        match self {
            Command::Create {
                title,
                description,
                priority,
                due_date,
            } => Some(NewTask {
                title: title.trim().to_string(),
                description: Some(description.clone()),
                priority: *priority,
                due_date: *due_date,
                completed: false,
            }),
            _ => None,
        }
    }

    /// Target id and changes when this is an `Update`.
    pub fn to_task_update(&self) -> Option<(TaskId, TaskUpdate)> {
        match self {
            Command::Update {
                id,
                title,
                description,
                completed,
                priority,
                due_date,
            } => Some((
                *id,
                TaskUpdate {
                    title: title.clone(),
                    description: description.clone(),
                    completed: *completed,
                    priority: *priority,
                    due_date: *due_date,
                },
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_value(Command::create("Buy milk", Priority::Medium)).unwrap(),
            json!({"action": "create", "title": "Buy milk", "description": "", "priority": "medium"})
        );
        assert_eq!(
            serde_json::to_value(Command::complete(1)).unwrap(),
            json!({"action": "update", "id": 1, "completed": true})
        );
        assert_eq!(
            serde_json::to_value(Command::delete(2)).unwrap(),
            json!({"action": "delete", "id": 2})
        );
        assert_eq!(
            serde_json::to_value(Command::list(ListFilter::Pending)).unwrap(),
            json!({"action": "list", "filter": "pending"})
        );
        assert_eq!(
            serde_json::to_value(Command::respond("hi")).unwrap(),
            json!({"action": "response", "message": "hi"})
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let cmd: Command =
            serde_json::from_str(r#"{"action": "create", "title": "Buy milk"}"#).unwrap();
        assert_eq!(cmd, Command::create("Buy milk", Priority::Medium));

        let cmd: Command = serde_json::from_str(r#"{"action": "list"}"#).unwrap();
        assert_eq!(cmd, Command::list(ListFilter::All));
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        assert!(serde_json::from_str::<Command>(r#"{"action": "create"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"action": "update", "completed": true}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"action": "delete"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"action": "response"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"action": "explode"}"#).is_err());
    }

    #[test]
    fn test_actionable() {
        assert!(!Command::create("   ", Priority::High).is_actionable());
        assert!(!Command::delete(0).is_actionable());
        assert!(Command::complete(3).is_actionable());
        let bare: Command = serde_json::from_str(r#"{"action": "update", "id": 2}"#).unwrap();
        assert!(!bare.is_actionable());
    }

    #[test]
    fn test_update_conversion() {
        let (id, changes) = Command::complete(4).to_task_update().unwrap();
        assert_eq!(id, 4);
        assert_eq!(changes, TaskUpdate::complete());
        assert!(Command::delete(4).to_task_update().is_none());
    }
}
