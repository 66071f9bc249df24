//! Task persistence and reconciliation.
//!
//! [`TaskStore`] is the persistence contract the execution core writes
//! through; [`TaskAndHistory`] is its unit of load and save. The
//! [`reconciler`] folds incoming [`Update`](a2a_types::Update) events into
//! that aggregate under the protocol's invariants, and the [`loader`] either
//! loads an existing aggregate or fabricates a fresh `submitted` task.

pub mod in_memory;
pub mod loader;
pub mod reconciler;

pub use in_memory::InMemoryTaskStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use a2a_types::{Message, Task};

use crate::errors::ServerResult;

/// The persistence aggregate: a task plus its canonical conversation history.
///
/// Created by the [`loader`], mutated only by the [`reconciler`], and owned
/// by whichever execution context currently drives the task. `task.history`
/// mirrors `history`; the reconciler keeps the two in sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskAndHistory {
    pub task: Task,
    pub history: Vec<Message>,
}

/// Persistence contract for task state.
///
/// Implementations key saves by `task.id` and must uphold the null-on-missing
/// contract: `load` returns `Ok(None)` for an absent id, never an error.
/// Atomicity across concurrent writers to the same task id is the store's own
/// concern; the reference implementation is last-write-wins.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Loads the aggregate for `task_id`, or `None` if it was never saved.
    async fn load(&self, task_id: &str) -> ServerResult<Option<TaskAndHistory>>;

    /// Stores or replaces the aggregate, keyed by `data.task.id`.
    async fn save(&self, data: &TaskAndHistory) -> ServerResult<()>;

    /// All task ids currently present in the store.
    async fn list_ids(&self) -> ServerResult<Vec<String>>;
}
