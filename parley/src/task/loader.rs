//! State loading: fetch an existing task aggregate or fabricate a fresh one.

use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use a2a_types::{Message, Task, TaskState, TaskStatus, TASK_KIND};

use crate::errors::ServerResult;
use crate::task::{TaskAndHistory, TaskStore};

/// Loads the aggregate for `task_id` when it exists, or fabricates a fresh
/// task in `submitted` state seeded with the inbound message.
///
/// On the load path the inbound message is returned untouched — the caller is
/// expected to feed it through the reconciler separately. On the create path
/// `message` is stamped in place with the new task/context ids; downstream
/// consumers read those fields off the message itself, so the side effect is
/// intentional.
pub async fn load_or_create(
    store: &dyn TaskStore,
    message: &mut Message,
    metadata: Option<HashMap<String, serde_json::Value>>,
    task_id: Option<String>,
    context_id: Option<String>,
) -> ServerResult<TaskAndHistory> {
    if let Some(id) = &task_id {
        if let Some(existing) = store.load(id).await? {
            return Ok(existing);
        }
    }

    let task_id = task_id.unwrap_or_else(new_id);
    let context_id = context_id.unwrap_or_else(new_id);
    message.task_id = Some(task_id.clone());
    message.context_id = Some(context_id.clone());

    let task = Task {
        kind: TASK_KIND.to_string(),
        id: task_id,
        context_id,
        status: TaskStatus {
            state: TaskState::Submitted,
            timestamp: Some(Utc::now().to_rfc3339()),
            message: None,
        },
        history: vec![message.clone()],
        artifacts: Vec::new(),
        metadata,
    };

    Ok(TaskAndHistory {
        history: vec![message.clone()],
        task,
    })
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
