//! In-memory implementation of the [`TaskStore`] trait.

use dashmap::DashMap;

use async_trait::async_trait;

use crate::errors::ServerResult;
use crate::task::{TaskAndHistory, TaskStore};

/// An in-memory, thread-safe [`TaskStore`] backed by a `DashMap`.
///
/// Suitable for tests and single-process deployments; state does not survive
/// a restart.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<String, TaskAndHistory>,
}

impl InMemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks. Primarily used by tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn load(&self, task_id: &str) -> ServerResult<Option<TaskAndHistory>> {
        Ok(self.tasks.get(task_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, data: &TaskAndHistory) -> ServerResult<()> {
        self.tasks.insert(data.task.id.clone(), data.clone());
        Ok(())
    }

    async fn list_ids(&self) -> ServerResult<Vec<String>> {
        Ok(self.tasks.iter().map(|entry| entry.key().clone()).collect())
    }
}
