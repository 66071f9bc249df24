//! Lifecycle hook slots and the protocol wiring installed per request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::error;
use uuid::Uuid;

use a2a_types::{Message, MessageRole, Part, TaskState, Update, MESSAGE_KIND};

use crate::errors::{ServerError, ServerResult};
use crate::runtime::status;
use crate::runtime::SessionRegistry;
use crate::task::reconciler::{process_update, Reconciler};
use crate::task::{loader, TaskAndHistory, TaskStore};

/// The five lifecycle callback slots of one task execution, each
/// independently overridable.
///
/// `Ok(None)` from the state-returning hooks means "no state change"; for
/// `on_update` specifically it means the update was dropped and must not be
/// broadcast to observers.
#[async_trait]
pub trait ExecutionHooks: Send + Sync {
    /// Produces the initial task aggregate for this execution.
    async fn on_start(&self) -> ServerResult<TaskAndHistory>;

    /// Folds one update into the tracked state. The default keeps a task
    /// snapshot outright and passes everything else through unchanged.
    async fn on_update(
        &self,
        current: TaskAndHistory,
        update: Update,
    ) -> ServerResult<Option<TaskAndHistory>> {
        Ok(Some(match update {
            Update::Task(task) => TaskAndHistory {
                history: task.history.clone(),
                task,
            },
            _ => current,
        }))
    }

    /// Reacts to cancellation observed while `update` was in flight.
    async fn on_cancel(
        &self,
        _current: Option<TaskAndHistory>,
        _update: Update,
    ) -> ServerResult<Option<TaskAndHistory>> {
        Ok(None)
    }

    /// Reacts to an execution failure. Must not fail the execution further;
    /// persistence here is best effort.
    async fn on_error(
        &self,
        _current: Option<TaskAndHistory>,
        _error: &ServerError,
    ) -> ServerResult<Option<TaskAndHistory>> {
        Ok(None)
    }

    /// Runs exactly once per execution, whatever the outcome.
    async fn on_complete(&self) -> ServerResult<()> {
        Ok(())
    }
}

/// The A2A protocol wiring of the hook slots, constructed per request.
pub struct A2aExecutionHooks {
    store: Arc<dyn TaskStore>,
    registry: Arc<SessionRegistry>,
    task_id: String,
    context_id: String,
    user_message: Message,
    metadata: Option<HashMap<String, serde_json::Value>>,
    reconciler: Mutex<Reconciler>,
}

impl A2aExecutionHooks {
    #[must_use]
    pub fn new(
        store: Arc<dyn TaskStore>,
        registry: Arc<SessionRegistry>,
        task_id: String,
        context_id: String,
        user_message: Message,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> Self {
        let reconciler = Mutex::new(Reconciler::new(context_id.clone()));
        Self {
            store,
            registry,
            task_id,
            context_id,
            user_message,
            metadata,
            reconciler,
        }
    }

    /// Builds the `canceled` status update persisted when cancellation lands,
    /// carrying over a status message from the in-flight update if it had one.
    fn canceled_update(&self, current: &TaskAndHistory, in_flight: &Update) -> Update {
        let message = match in_flight {
            Update::StatusUpdate(event) => event.status.message.clone(),
            _ => None,
        };
        Update::StatusUpdate(status::status_event(
            &current.task.id,
            &current.task.context_id,
            TaskState::Canceled,
            message,
        ))
    }

    fn failed_update(&self, current: &TaskAndHistory, error: &ServerError) -> Update {
        let message = Message {
            kind: MESSAGE_KIND.to_string(),
            message_id: Uuid::new_v4().to_string(),
            role: MessageRole::Agent,
            parts: vec![Part::text(error.to_string())],
            context_id: Some(current.task.context_id.clone()),
            task_id: Some(current.task.id.clone()),
            reference_task_ids: Vec::new(),
            extensions: Vec::new(),
            metadata: None,
        };
        Update::StatusUpdate(status::status_event(
            &current.task.id,
            &current.task.context_id,
            TaskState::Failed,
            Some(message),
        ))
    }
}

#[async_trait]
impl ExecutionHooks for A2aExecutionHooks {
    async fn on_start(&self) -> ServerResult<TaskAndHistory> {
        if self.user_message.parts.is_empty() {
            return Err(ServerError::InvalidParams(
                "message must carry at least one part".to_string(),
            ));
        }
        self.registry.add_connection(&self.context_id);

        let mut message = self.user_message.clone();
        loader::load_or_create(
            self.store.as_ref(),
            &mut message,
            self.metadata.clone(),
            Some(self.task_id.clone()),
            Some(self.context_id.clone()),
        )
        .await
    }

    async fn on_update(
        &self,
        current: TaskAndHistory,
        update: Update,
    ) -> ServerResult<Option<TaskAndHistory>> {
        // Second line of defense behind the driver's own check: once the
        // context is cancelled, in-flight updates are silently dropped.
        if self.registry.is_cancelled(&self.context_id) {
            return Ok(None);
        }

        let mut reconciler = self.reconciler.lock().await;
        match process_update(&mut reconciler, self.store.as_ref(), current, &update).await {
            Ok(next) => Ok(Some(next)),
            Err(err) => {
                error!(
                    task_id = %self.task_id,
                    kind = update.kind(),
                    error = %err,
                    "failed to reconcile update"
                );
                Err(err)
            }
        }
    }

    async fn on_cancel(
        &self,
        current: Option<TaskAndHistory>,
        update: Update,
    ) -> ServerResult<Option<TaskAndHistory>> {
        self.registry.mark_cancelled(&self.context_id);

        let Some(current) = current else {
            return Ok(None);
        };
        let canceled = self.canceled_update(&current, &update);
        let mut reconciler = self.reconciler.lock().await;
        let next = process_update(&mut reconciler, self.store.as_ref(), current, &canceled).await?;
        Ok(Some(next))
    }

    async fn on_error(
        &self,
        current: Option<TaskAndHistory>,
        error: &ServerError,
    ) -> ServerResult<Option<TaskAndHistory>> {
        // Without a resolvable task there is nothing to mark failed.
        let Some(current) = current else {
            return Ok(None);
        };
        if current.task.id.is_empty() {
            return Ok(None);
        }

        let failed = self.failed_update(&current, error);
        let mut reconciler = self.reconciler.lock().await;
        match process_update(&mut reconciler, self.store.as_ref(), current, &failed).await {
            Ok(next) => Ok(Some(next)),
            Err(persist_err) => {
                error!(
                    task_id = %self.task_id,
                    error = %persist_err,
                    "failed to persist failure status"
                );
                Ok(None)
            }
        }
    }

    async fn on_complete(&self) -> ServerResult<()> {
        self.registry.clear_cancelled(&self.context_id);
        self.registry.remove_connection(&self.context_id);
        Ok(())
    }
}
