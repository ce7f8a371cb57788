//! Demo data seeder.
//!
//! Fills the configured task store with a handful of sample todos. Refuses
//! to touch a non-empty store unless `--force` is given.

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasktalk::api::task_store::{create_task_store, TaskStore};
use tasktalk::config::Config;
use tasktalk::task::{NewTask, Priority};

/// Sample todos, due dates relative to `now`.
fn sample_tasks(now: DateTime<Utc>) -> Vec<NewTask> {
    let due = |days: i64| Some(now + Duration::days(days));
    vec![
        NewTask {
            due_date: due(1),
            ..NewTask::new("Buy groceries")
                .with_description("Get milk, eggs, bread, and fruits from the store")
                .with_priority(Priority::High)
        },
        NewTask {
            due_date: due(3),
            ..NewTask::new("Finish project report")
                .with_description("Complete the quarterly analysis report for the team meeting")
                .with_priority(Priority::High)
        },
        NewTask {
            due_date: due(7),
            ..NewTask::new("Call dentist")
                .with_description("Schedule annual dental checkup appointment")
                .with_priority(Priority::Medium)
        },
        NewTask::new("Exercise")
            .with_description("30 minutes of cardio workout")
            .with_priority(Priority::Medium),
        NewTask::new("Read book")
            .with_description("Continue reading \"The Pragmatic Programmer\"")
            .with_priority(Priority::Low),
        NewTask {
            completed: true,
            ..NewTask::new("Water plants")
                .with_description("Water all the indoor plants")
                .with_priority(Priority::Low)
        },
        NewTask {
            due_date: due(14),
            ..NewTask::new("Update resume")
                .with_description("Add recent project experience and skills")
                .with_priority(Priority::Medium)
        },
    ]
}

/// Insert the sample todos. Returns how many were created; zero when the
/// store already has data and `force` is off.
async fn seed(store: &dyn TaskStore, force: bool) -> anyhow::Result<usize> {
    let existing = store.count_tasks().await?;
    if existing > 0 && !force {
        info!(existing, "Store already has todos; pass --force to add samples anyway");
        return Ok(0);
    }

    let mut created = 0;
    for task in sample_tasks(Utc::now()) {
        let task = store.create_task(task).await?;
        info!(id = task.id, title = %task.title, priority = %task.priority, "Created sample todo");
        created += 1;
    }
    Ok(created)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_demo=info,tasktalk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let force = std::env::args().skip(1).any(|arg| arg == "--force");
    let config = Config::from_env()?;
    let store = create_task_store(config.store, config.database_path.clone()).await?;
    if !store.is_persistent() {
        tracing::warn!("TASK_STORE is not persistent; seeded todos will be lost on exit");
    }

    let created = seed(store.as_ref(), force).await?;
    info!(created, total = store.count_tasks().await?, "Demo setup finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktalk::api::task_store::InMemoryTaskStore;
    use tasktalk::task::ListFilter;

    #[test]
    fn test_sample_tasks() {
        let now = Utc::now();
        let tasks = sample_tasks(now);
        assert_eq!(tasks.len(), 7);
        assert_eq!(tasks.iter().filter(|t| t.completed).count(), 1);
        assert_eq!(tasks[0].due_date, Some(now + Duration::days(1)));
        assert_eq!(tasks[3].due_date, None);
    }

    #[tokio::test]
    async fn test_seed_refuses_non_empty_store() {
        let store = InMemoryTaskStore::new();
        assert_eq!(seed(&store, false).await.unwrap(), 7);
        assert_eq!(seed(&store, false).await.unwrap(), 0);
        assert_eq!(seed(&store, true).await.unwrap(), 7);

        let completed = store.list_tasks(ListFilter::Completed).await.unwrap();
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|t| t.title == "Water plants"));
    }
}
