//! Task creation and lookup.

use chrono::Utc;
use std::sync::Arc;
use crate::errors::AppResult;
use crate::models::{NewTask, Task};
use super::document_store::{by_id, decode, encode, match_all, DocumentStore};

pub const TASKS: &str = "tasks";

#[derive(Clone)]
pub struct TaskStore {
    store: Arc<dyn DocumentStore>,
}

impl TaskStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validates the input, then persists it with an assigned id and creation time.
    /// Invalid input never reaches the store.
    pub async fn create_task(&self, input: NewTask) -> AppResult<Task> {
        let mut task = input.validate()?.into_task(Utc::now());
        task.id = self.store.insert(TASKS, encode(&task)?).await?;

        tracing::info!("Created task {} ({})", task.id, task.title);
        Ok(task)
    }

    /// `None` when no task has this id.
    pub async fn get_task(&self, id: &str) -> AppResult<Option<Task>> {
        match self.store.find_one(TASKS, &by_id(id)).await? {
            Some(document) => Ok(Some(decode(document)?)),
            None => Ok(None),
        }
    }

    /// Every task, in the order the store returns them. No sort is applied.
    pub async fn list_tasks(&self) -> AppResult<Vec<Task>> {
        let documents = self.store.find_all(TASKS, &match_all()).await?;
        let tasks = documents
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<Task>, _>>()?;
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::errors::AppError;
    use crate::services::InMemoryStore;

    fn task_store() -> (TaskStore, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (TaskStore::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_task_returns_full_record() {
        let (tasks, _) = task_store();
        let before = Utc::now();

        let task = tasks
            .create_task(NewTask::new("Buy milk", "2% milk, 1 gallon", "2025-01-01"))
            .await
            .unwrap();

        assert!(!task.id.is_empty());
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2% milk, 1 gallon");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(task.file, None);
        assert!(task.created_at >= before);
        assert!(task.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_created_task_can_be_fetched() {
        let (tasks, _) = task_store();
        let created = tasks
            .create_task(
                NewTask::new("Read book", "Finish chapter four", "2025-02-10")
                    .with_file("1700000000000-notes.txt"),
            )
            .await
            .unwrap();

        let fetched = tasks.get_task(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.file.as_deref(), Some("1700000000000-notes.txt"));
    }

    #[tokio::test]
    async fn test_invalid_task_is_not_persisted() {
        let (tasks, store) = task_store();

        let result = tasks.create_task(NewTask::new("Hi", "ok", "2025-01-01")).await;
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors.has_field("title"));
                assert!(errors.has_field("description"));
            }
            other => panic!("Expected validation error, got: {:?}", other),
        }

        assert!(store.find_all(TASKS, &match_all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_rule_blocks_persistence() {
        let (tasks, store) = task_store();
        let cases = [
            ("ab", "long enough", "2025-01-01", "title"),
            ("Fine", "four", "2025-01-01", "description"),
            ("Fine", "long enough", "", "dueDate"),
            ("Fine", "long enough", "not-a-date", "dueDate"),
        ];

        for (title, description, due, field) in cases {
            match tasks.create_task(NewTask::new(title, description, due)).await {
                Err(AppError::Validation(errors)) => {
                    assert_eq!(errors.fields.len(), 1, "case {}", field);
                    assert_eq!(errors.fields[0].field, field);
                }
                other => panic!("Expected validation error for {}, got: {:?}", field, other),
            }
        }

        assert!(store.find_all(TASKS, &match_all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_task_is_none() {
        let (tasks, _) = task_store();
        tasks
            .create_task(NewTask::new("Buy milk", "2% milk, 1 gallon", "2025-01-01"))
            .await
            .unwrap();

        assert!(tasks.get_task("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_tasks_in_insertion_order() {
        let (tasks, _) = task_store();
        for (title, due) in [("Zeta", "2025-03-01"), ("Alpha", "2025-01-01"), ("Mid", "2025-02-01")] {
            tasks
                .create_task(NewTask::new(title, "some description", due))
                .await
                .unwrap();
        }

        let titles: Vec<_> = tasks
            .list_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[tokio::test]
    async fn test_list_tasks_empty() {
        let (tasks, _) = task_store();
        assert!(tasks.list_tasks().await.unwrap().is_empty());
    }
}
