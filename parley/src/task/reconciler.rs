//! Update reconciliation: folds one incoming [`Update`] into a
//! [`TaskAndHistory`] aggregate under the protocol's invariants.

use chrono::Utc;
use std::collections::HashMap;
use tracing::error;

use a2a_types::{Artifact, Message, Task, Update};

use crate::errors::{ServerError, ServerResult};
use crate::task::{TaskAndHistory, TaskStore};

/// Per-execution reconciliation state.
///
/// Holds the "latest pending message" slot: a `message`-kind update parks the
/// message here until a later `task`-kind snapshot splices it into history.
#[derive(Debug)]
pub struct Reconciler {
    context_id: String,
    pending_message: Option<Message>,
}

impl Reconciler {
    #[must_use]
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            pending_message: None,
        }
    }

    /// Applies `update` to `current` in place, returning whether the update
    /// was accepted. Rejections are logged, never panicked; the caller decides
    /// whether a rejection is fatal (see [`process_update`]).
    pub fn apply(&mut self, current: &mut TaskAndHistory, update: &Update) -> bool {
        if current.task.id.is_empty() {
            error!(kind = update.kind(), "cannot reconcile update: current task has no id");
            return false;
        }
        if self.context_id.is_empty() {
            error!(kind = update.kind(), "cannot reconcile update: execution has no context id");
            return false;
        }

        match update {
            Update::Message(message) => {
                // Parked until a task snapshot arrives; the task itself is
                // untouched by a bare message event.
                self.pending_message = Some(message.clone());
                true
            }
            Update::Task(snapshot) => {
                merge_task_snapshot(&mut current.task, snapshot);
                if !snapshot.history.is_empty() {
                    current.history = current.task.history.clone();
                }
                if let Some(pending) = self.pending_message.take() {
                    let known = current
                        .task
                        .history
                        .iter()
                        .any(|m| m.message_id == pending.message_id);
                    if known {
                        self.pending_message = Some(pending);
                    } else {
                        current.task.history.insert(0, pending.clone());
                        current.history.insert(0, pending);
                    }
                }
                true
            }
            Update::StatusUpdate(event) => {
                if event.task_id != current.task.id {
                    error!(
                        incoming = %event.task_id,
                        current = %current.task.id,
                        "status update rejected: task id mismatch"
                    );
                    return false;
                }
                current.task.status = event.status.clone();
                // The reconciler is the timestamp authority; whatever the
                // update supplied is informational only.
                current.task.status.timestamp = Some(Utc::now().to_rfc3339());
                if let Some(message) = current.task.status.message.clone() {
                    let known = current
                        .task
                        .history
                        .iter()
                        .any(|m| m.message_id == message.message_id);
                    if !known {
                        current.task.history.push(message.clone());
                        current.history.push(message);
                    }
                }
                true
            }
            Update::ArtifactUpdate(event) => {
                if event.task_id != current.task.id {
                    // Compatibility quirk: unlike the status path this still
                    // reports acceptance even though the mutation is skipped.
                    error!(
                        incoming = %event.task_id,
                        current = %current.task.id,
                        "artifact update ignored: task id mismatch"
                    );
                    return true;
                }
                merge_artifact(
                    &mut current.task.artifacts,
                    &event.artifact,
                    event.append.unwrap_or(false),
                );
                true
            }
        }
    }
}

/// Merges a full task snapshot onto `task`, field by field; incoming values
/// win, with empty collections treated as "absent" so a sparse snapshot does
/// not wipe accumulated state.
fn merge_task_snapshot(task: &mut Task, incoming: &Task) {
    if !incoming.id.is_empty() {
        task.id = incoming.id.clone();
    }
    if !incoming.context_id.is_empty() {
        task.context_id = incoming.context_id.clone();
    }
    task.status = incoming.status.clone();
    if !incoming.history.is_empty() {
        task.history = incoming.history.clone();
    }
    if !incoming.artifacts.is_empty() {
        task.artifacts = incoming.artifacts.clone();
    }
    if incoming.metadata.is_some() {
        task.metadata = incoming.metadata.clone();
    }
}

/// Find-or-create merge of one artifact into the task's artifact list.
///
/// With `append` the incoming parts extend the existing artifact and incoming
/// metadata keys override; without it the slot is replaced wholesale.
fn merge_artifact(artifacts: &mut Vec<Artifact>, incoming: &Artifact, append: bool) {
    match artifacts
        .iter_mut()
        .find(|a| a.artifact_id == incoming.artifact_id)
    {
        Some(existing) if append => {
            existing.parts.extend(incoming.parts.iter().cloned());
            if incoming.name.is_some() {
                existing.name = incoming.name.clone();
            }
            if incoming.description.is_some() {
                existing.description = incoming.description.clone();
            }
            if let Some(metadata) = &incoming.metadata {
                let merged = existing.metadata.get_or_insert_with(HashMap::new);
                for (key, value) in metadata {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        Some(existing) => {
            *existing = incoming.clone();
        }
        None => artifacts.push(incoming.clone()),
    }
}

/// Applies `update` and persists the mutated aggregate.
///
/// A rejected update is a local invariant violation: nothing is persisted and
/// the caller sees [`ServerError::InvalidUpdate`].
pub async fn process_update(
    reconciler: &mut Reconciler,
    store: &dyn TaskStore,
    mut current: TaskAndHistory,
    update: &Update,
) -> ServerResult<TaskAndHistory> {
    if !reconciler.apply(&mut current, update) {
        return Err(ServerError::InvalidUpdate {
            reason: format!(
                "{} update rejected for task {}",
                update.kind(),
                current.task.id
            ),
        });
    }
    store.save(&current).await?;
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::InMemoryTaskStore;
    use a2a_types::{
        MessageRole, Part, TaskArtifactUpdateEvent, TaskState, TaskStatus, TaskStatusUpdateEvent,
        ARTIFACT_UPDATE_KIND, MESSAGE_KIND, STATUS_UPDATE_KIND, TASK_KIND,
    };
    use serde_json::json;

    fn aggregate() -> TaskAndHistory {
        TaskAndHistory {
            task: Task {
                kind: TASK_KIND.to_string(),
                id: "task-1".to_string(),
                context_id: "ctx-1".to_string(),
                status: TaskStatus {
                    state: TaskState::Submitted,
                    timestamp: Some("2020-01-01T00:00:00Z".to_string()),
                    message: None,
                },
                history: Vec::new(),
                artifacts: Vec::new(),
                metadata: None,
            },
            history: Vec::new(),
        }
    }

    fn message(id: &str, text: &str) -> Message {
        Message {
            kind: MESSAGE_KIND.to_string(),
            message_id: id.to_string(),
            role: MessageRole::User,
            parts: vec![Part::text(text)],
            context_id: Some("ctx-1".to_string()),
            task_id: Some("task-1".to_string()),
            reference_task_ids: Vec::new(),
            extensions: Vec::new(),
            metadata: None,
        }
    }

    fn status_event(task_id: &str, state: TaskState) -> TaskStatusUpdateEvent {
        TaskStatusUpdateEvent {
            kind: STATUS_UPDATE_KIND.to_string(),
            task_id: task_id.to_string(),
            context_id: "ctx-1".to_string(),
            status: TaskStatus {
                state,
                timestamp: Some("1999-12-31T23:59:59Z".to_string()),
                message: None,
            },
            is_final: state.is_final(),
            metadata: None,
        }
    }

    fn artifact(id: &str, text: &str) -> Artifact {
        Artifact {
            artifact_id: id.to_string(),
            parts: vec![Part::text(text)],
            name: None,
            description: None,
            extensions: Vec::new(),
            metadata: None,
        }
    }

    fn artifact_event(task_id: &str, artifact: Artifact, append: Option<bool>) -> Update {
        Update::ArtifactUpdate(TaskArtifactUpdateEvent {
            kind: ARTIFACT_UPDATE_KIND.to_string(),
            task_id: task_id.to_string(),
            context_id: "ctx-1".to_string(),
            artifact,
            append,
            last_chunk: None,
            metadata: None,
        })
    }

    #[test]
    fn duplicate_message_inserted_once_into_history() {
        // Same message twice, then a task snapshot, yields one history copy.
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        let msg = message("msg-1", "hello");

        assert!(reconciler.apply(&mut current, &Update::Message(msg.clone())));
        assert!(reconciler.apply(&mut current, &Update::Message(msg.clone())));
        assert!(current.task.history.is_empty(), "message must not touch the task");

        let snapshot = current.task.clone();
        assert!(reconciler.apply(&mut current, &Update::Task(snapshot)));

        let copies = current
            .task
            .history
            .iter()
            .filter(|m| m.message_id == "msg-1")
            .count();
        assert_eq!(copies, 1);
        assert_eq!(current.history.len(), 1);
    }

    #[test]
    fn pending_message_is_prepended_not_appended() {
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        current.task.history = vec![message("earlier", "old")];
        current.history = current.task.history.clone();

        assert!(reconciler.apply(&mut current, &Update::Message(message("msg-2", "new"))));
        let snapshot = current.task.clone();
        assert!(reconciler.apply(&mut current, &Update::Task(snapshot)));

        assert_eq!(current.task.history[0].message_id, "msg-2");
        assert_eq!(current.history[0].message_id, "msg-2");
    }

    #[test]
    fn status_timestamp_is_reconciler_authored() {
        // A forged inbound timestamp never survives reconciliation.
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();

        let event = status_event("task-1", TaskState::Working);
        assert!(reconciler.apply(&mut current, &Update::StatusUpdate(event)));

        let stamped = current.task.status.timestamp.as_deref().expect("timestamp");
        assert_ne!(stamped, "1999-12-31T23:59:59Z");
        assert_eq!(current.task.status.state, TaskState::Working);
    }

    #[test]
    fn status_message_appends_at_tail_with_dedup() {
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        current.task.history = vec![message("earlier", "old")];
        current.history = current.task.history.clone();

        let mut event = status_event("task-1", TaskState::Working);
        event.status.message = Some(message("status-msg", "progress"));
        assert!(reconciler.apply(&mut current, &Update::StatusUpdate(event.clone())));
        assert_eq!(current.task.history.last().unwrap().message_id, "status-msg");

        // Applying again must not duplicate the message.
        assert!(reconciler.apply(&mut current, &Update::StatusUpdate(event)));
        let copies = current
            .task
            .history
            .iter()
            .filter(|m| m.message_id == "status-msg")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn artifact_append_extends_and_replace_overwrites() {
        // Append concatenates parts; replace swaps the slot.
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        current.task.artifacts = vec![artifact("a1", "p1")];

        let update = artifact_event("task-1", artifact("a1", "p2"), Some(true));
        assert!(reconciler.apply(&mut current, &update));
        let parts: Vec<_> = current.task.artifacts[0]
            .parts
            .iter()
            .filter_map(Part::as_text)
            .collect();
        assert_eq!(parts, vec!["p1", "p2"]);

        let update = artifact_event("task-1", artifact("a1", "p3"), None);
        assert!(reconciler.apply(&mut current, &update));
        let parts: Vec<_> = current.task.artifacts[0]
            .parts
            .iter()
            .filter_map(Part::as_text)
            .collect();
        assert_eq!(parts, vec!["p3"]);
    }

    #[test]
    fn artifact_append_merges_metadata_and_names() {
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        let mut existing = artifact("a1", "p1");
        existing.metadata = Some(HashMap::from([
            ("keep".to_string(), json!(1)),
            ("clash".to_string(), json!("old")),
        ]));
        current.task.artifacts = vec![existing];

        let mut incoming = artifact("a1", "p2");
        incoming.name = Some("named".to_string());
        incoming.metadata = Some(HashMap::from([("clash".to_string(), json!("new"))]));
        assert!(reconciler.apply(
            &mut current,
            &artifact_event("task-1", incoming, Some(true))
        ));

        let merged = &current.task.artifacts[0];
        assert_eq!(merged.name.as_deref(), Some("named"));
        let metadata = merged.metadata.as_ref().expect("metadata");
        assert_eq!(metadata["keep"], json!(1));
        assert_eq!(metadata["clash"], json!("new"));
    }

    #[test]
    fn unknown_artifact_id_is_appended_as_new() {
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        current.task.artifacts = vec![artifact("a1", "p1")];

        assert!(reconciler.apply(
            &mut current,
            &artifact_event("task-1", artifact("a2", "other"), None)
        ));
        assert_eq!(current.task.artifacts.len(), 2);
        assert_eq!(current.task.artifacts[1].artifact_id, "a2");
    }

    #[test]
    fn task_id_mismatch_asymmetry_between_status_and_artifact() {
        // A mismatched status update is rejected (`false`, no mutation);
        // the analogous artifact update skips the mutation but returns `true`.
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        let before = current.clone();

        let accepted = reconciler.apply(
            &mut current,
            &Update::StatusUpdate(status_event("other-task", TaskState::Completed)),
        );
        assert!(!accepted);
        assert_eq!(current, before);

        let accepted = reconciler.apply(
            &mut current,
            &artifact_event("other-task", artifact("a1", "p1"), None),
        );
        assert!(accepted, "artifact mismatch still reports acceptance");
        assert!(current.task.artifacts.is_empty(), "but nothing is mutated");
    }

    #[test]
    fn missing_task_id_rejects_any_update() {
        let mut reconciler = Reconciler::new("ctx-1");
        let mut current = aggregate();
        current.task.id = String::new();

        let accepted = reconciler.apply(&mut current, &Update::Message(message("m", "x")));
        assert!(!accepted);
    }

    #[test]
    fn missing_context_id_rejects_any_update() {
        let mut reconciler = Reconciler::new("");
        let mut current = aggregate();

        let accepted = reconciler.apply(&mut current, &Update::Message(message("m", "x")));
        assert!(!accepted);
    }

    #[tokio::test]
    async fn process_update_persists_on_acceptance() {
        let store = InMemoryTaskStore::new();
        let mut reconciler = Reconciler::new("ctx-1");
        let current = aggregate();

        let next = process_update(
            &mut reconciler,
            &store,
            current,
            &Update::StatusUpdate(status_event("task-1", TaskState::Working)),
        )
        .await
        .expect("accepted update persists");

        assert_eq!(next.task.status.state, TaskState::Working);
        let stored = store.load("task-1").await.expect("load").expect("saved");
        assert_eq!(stored.task.status.state, TaskState::Working);
    }

    #[tokio::test]
    async fn process_update_rejection_persists_nothing() {
        let store = InMemoryTaskStore::new();
        let mut reconciler = Reconciler::new("ctx-1");
        let current = aggregate();

        let err = process_update(
            &mut reconciler,
            &store,
            current,
            &Update::StatusUpdate(status_event("other-task", TaskState::Working)),
        )
        .await
        .expect_err("rejected update is fatal");

        assert!(matches!(err, ServerError::InvalidUpdate { .. }));
        assert!(store.load("task-1").await.expect("load").is_none());
    }
}
