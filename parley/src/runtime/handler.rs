//! The A2A protocol method surface: send, stream, get, cancel, resubscribe.

use std::sync::Arc;

use dashmap::DashMap;
use futures::StreamExt;
use tracing::{debug, error};
use uuid::Uuid;

use a2a_types::{
    MessageSendParams, PushNotificationConfig, SendMessageResult, Task, TaskArtifactUpdateEvent,
    TaskIdParams, TaskPushNotificationConfig, TaskQueryParams, TaskState, TaskStatusUpdateEvent,
    Update, ARTIFACT_UPDATE_KIND, STATUS_UPDATE_KIND,
};

use crate::engine::{Engine, UpdateStream};
use crate::errors::{ServerError, ServerResult};
use crate::events::{A2aExecutionHooks, LifecycleEvent};
use crate::runtime::{status, stream, ExecutionContext, SessionRegistry};
use crate::task::reconciler::{process_update, Reconciler};
use crate::task::TaskStore;

/// Orchestrates task executions for one engine against one store.
///
/// One handler serves many concurrent requests; executions share only the
/// [`SessionRegistry`] and the store. Live executions are tracked by context
/// id until they report completion.
pub struct RequestHandler {
    engine: Arc<dyn Engine>,
    store: Arc<dyn TaskStore>,
    registry: Arc<SessionRegistry>,
    contexts: Arc<DashMap<String, Arc<ExecutionContext>>>,
    push_configs: DashMap<String, PushNotificationConfig>,
}

impl RequestHandler {
    #[must_use]
    pub fn new(engine: Arc<dyn Engine>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            engine,
            store,
            registry: Arc::new(SessionRegistry::new()),
            contexts: Arc::new(DashMap::new()),
            push_configs: DashMap::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handles `message/send`: runs the execution to completion and returns
    /// only the terminal task. Blocking mode drains the same stream the
    /// streaming path uses; intermediate updates are discarded (they are
    /// still reconciled and persisted along the way).
    pub async fn send_message(&self, params: MessageSendParams) -> ServerResult<SendMessageResult> {
        let context = self.build_context(params)?;
        self.watch_completion(&context).await;

        let mut updates =
            stream::stream_execution(Arc::clone(&self.engine), Arc::clone(&context), false);
        let mut failure = None;
        while let Some(item) = updates.next().await {
            if let Err(error) = item {
                failure = Some(error);
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let task = context
            .current_task()
            .await
            .ok_or_else(|| ServerError::Internal {
                component: "runtime".to_string(),
                reason: "execution finished without task state".to_string(),
            })?;
        Ok(SendMessageResult::Task(task))
    }

    /// Handles `message/stream`: returns the execution as an incremental
    /// update sequence. A synthesized `submitted` + `working` status pair
    /// bootstraps the stream, and the terminal task snapshot is the last
    /// item.
    pub async fn stream_message(&self, params: MessageSendParams) -> ServerResult<UpdateStream> {
        let context = self.build_context(params)?;
        self.watch_completion(&context).await;

        let engine: Arc<dyn Engine> = Arc::new(BootstrapEngine {
            inner: Arc::clone(&self.engine),
        });
        Ok(stream::stream_execution(engine, context, true))
    }

    /// Handles `tasks/get`, honoring the optional history length limit.
    pub async fn get_task(&self, params: TaskQueryParams) -> ServerResult<Task> {
        let data = self
            .store
            .load(&params.id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound {
                task_id: params.id.clone(),
            })?;

        let mut task = data.task;
        if let Some(limit) = params.history_length {
            if limit >= 0 {
                let limit = limit as usize;
                if task.history.len() > limit {
                    task.history = task.history.split_off(task.history.len() - limit);
                }
            }
        }
        Ok(task)
    }

    /// Handles `tasks/cancel`. Idempotent at the registry level; a task
    /// already in a final state fails with `TaskNotCancelable`.
    pub async fn cancel_task(&self, params: TaskIdParams) -> ServerResult<Task> {
        let data = self
            .store
            .load(&params.id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound {
                task_id: params.id.clone(),
            })?;

        if data.task.status.state.is_final() {
            return Err(ServerError::TaskNotCancelable {
                task_id: params.id,
                state: data.task.status.state,
            });
        }

        let task_id = data.task.id.clone();
        let context_id = data.task.context_id.clone();
        self.registry.mark_cancelled(&context_id);

        let live = self
            .contexts
            .get(&context_id)
            .map(|entry| Arc::clone(entry.value()));
        if let Some(context) = live {
            // A running engine learns of the cancellation in-band: the cancel
            // hook persists the canceled status and the driver stops pumping
            // at its next check.
            let in_flight = Update::StatusUpdate(status::status_event(
                &task_id,
                &context_id,
                TaskState::Canceled,
                None,
            ));
            context.events().notify_cancel(in_flight).await?;
            self.watch_cancel_cleanup(&context).await;

            if let Some(task) = context.current_task().await {
                return Ok(task);
            }
            // The execution exists but has not started; persist directly and
            // leave the flag for its own completion to clear.
            let next = Self::persist_canceled(self.store.as_ref(), data).await?;
            return Ok(next);
        }

        // No live execution for this context: persist the canceled snapshot
        // and drop the flag, since nothing will ever report completion.
        let next = Self::persist_canceled(self.store.as_ref(), data).await?;
        self.registry.clear_cancelled(&context_id);
        Ok(next)
    }

    /// Handles `tasks/resubscribe`: replays the task's current status, then —
    /// for finished tasks — each artifact, draining the replayed list. A
    /// still-running task's stream stays attached to the live execution and
    /// relays its subsequent updates.
    pub async fn resubscribe(&self, params: TaskIdParams) -> ServerResult<UpdateStream> {
        let data = self
            .store
            .load(&params.id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound {
                task_id: params.id.clone(),
            })?;

        let mut task = data.task;
        let is_final = task.status.state.is_final();

        // Replay the stored status as-is; this is history, not a new
        // reconciliation, so the stored timestamp survives.
        let mut replay = vec![Update::StatusUpdate(TaskStatusUpdateEvent {
            kind: STATUS_UPDATE_KIND.to_string(),
            task_id: task.id.clone(),
            context_id: task.context_id.clone(),
            status: task.status.clone(),
            is_final,
            metadata: None,
        })];

        if is_final {
            let task_id = task.id.clone();
            let context_id = task.context_id.clone();
            for artifact in task.artifacts.drain(..) {
                replay.push(Update::ArtifactUpdate(TaskArtifactUpdateEvent {
                    kind: ARTIFACT_UPDATE_KIND.to_string(),
                    task_id: task_id.clone(),
                    context_id: context_id.clone(),
                    artifact,
                    append: None,
                    last_chunk: None,
                    metadata: None,
                }));
            }
        }

        let live = if is_final {
            None
        } else {
            self.contexts
                .get(&task.context_id)
                .map(|entry| Arc::clone(entry.value()))
        };
        let receiver = match live {
            Some(context) => Some(context.events().subscribe().await),
            None => None,
        };

        Ok(Box::pin(async_stream::stream! {
            for update in replay {
                yield Ok(update);
            }
            if let Some(mut events) = receiver {
                while let Some(event) = events.recv().await {
                    match event {
                        LifecycleEvent::Update(update) => yield Ok(update),
                        LifecycleEvent::Error(reason) => {
                            yield Err(ServerError::Engine { reason });
                            break;
                        }
                        LifecycleEvent::Complete => break,
                        _ => {}
                    }
                }
            }
        }))
    }

    /// Handles `tasks/pushNotificationConfig/set`: pass-through storage.
    pub async fn set_push_notification(
        &self,
        params: TaskPushNotificationConfig,
    ) -> ServerResult<TaskPushNotificationConfig> {
        self.store
            .load(&params.task_id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound {
                task_id: params.task_id.clone(),
            })?;

        self.push_configs
            .insert(params.task_id.clone(), params.push_notification_config.clone());
        Ok(params)
    }

    /// Handles `tasks/pushNotificationConfig/get`.
    pub async fn get_push_notification(
        &self,
        params: TaskIdParams,
    ) -> ServerResult<TaskPushNotificationConfig> {
        self.store
            .load(&params.id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound {
                task_id: params.id.clone(),
            })?;

        let config = self
            .push_configs
            .get(&params.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                ServerError::InvalidParams(format!(
                    "no push notification config set for task {}",
                    params.id
                ))
            })?;

        Ok(TaskPushNotificationConfig {
            task_id: params.id,
            push_notification_config: config,
        })
    }

    fn build_context(&self, params: MessageSendParams) -> ServerResult<Arc<ExecutionContext>> {
        let mut message = params.message;
        if message.parts.is_empty() {
            return Err(ServerError::InvalidParams(
                "message must carry at least one part".to_string(),
            ));
        }

        let task_id = message
            .task_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        message.task_id = Some(task_id.clone());
        message.context_id = Some(context_id.clone());

        debug!(task_id = %task_id, context_id = %context_id, "starting task execution");

        let hooks = A2aExecutionHooks::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            task_id.clone(),
            context_id.clone(),
            message.clone(),
            params.metadata.clone(),
        );
        let context = Arc::new(ExecutionContext::new(
            task_id,
            context_id.clone(),
            message,
            params.metadata,
            Arc::clone(&self.registry),
            Box::new(hooks),
        ));
        self.contexts.insert(context_id, Arc::clone(&context));
        Ok(context)
    }

    /// Drops the live-context entry once the execution reports completion.
    async fn watch_completion(&self, context: &Arc<ExecutionContext>) {
        let mut events = context.events().subscribe().await;
        let contexts = Arc::clone(&self.contexts);
        let context_id = context.context_id().to_string();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if matches!(event, LifecycleEvent::Complete) {
                    contexts.remove(&context_id);
                    break;
                }
            }
        });
    }

    /// One-shot cleanup installed by `cancel_task`: once the live execution
    /// reports completion, the cancellation flag and the context entry go
    /// away. Redundant with the execution's own completion hook by design —
    /// both removals are idempotent.
    async fn watch_cancel_cleanup(&self, context: &Arc<ExecutionContext>) {
        let mut events = context.events().subscribe().await;
        let registry = Arc::clone(&self.registry);
        let contexts = Arc::clone(&self.contexts);
        let context_id = context.context_id().to_string();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if matches!(event, LifecycleEvent::Complete) {
                    registry.clear_cancelled(&context_id);
                    contexts.remove(&context_id);
                    break;
                }
            }
        });
    }

    async fn persist_canceled(
        store: &dyn TaskStore,
        data: crate::task::TaskAndHistory,
    ) -> ServerResult<Task> {
        let canceled = Update::StatusUpdate(status::status_event(
            &data.task.id,
            &data.task.context_id,
            TaskState::Canceled,
            None,
        ));
        let mut reconciler = Reconciler::new(data.task.context_id.clone());
        match process_update(&mut reconciler, store, data, &canceled).await {
            Ok(next) => Ok(next.task),
            Err(err) => {
                error!(error = %err, "failed to persist canceled status");
                Err(err)
            }
        }
    }
}

/// Prepends the synthesized `submitted` + `working` status pair to the
/// wrapped engine's updates for `message/stream` bootstrap.
struct BootstrapEngine {
    inner: Arc<dyn Engine>,
}

impl Engine for BootstrapEngine {
    fn execute(&self, context: Arc<ExecutionContext>) -> UpdateStream {
        let lead = futures::stream::iter(vec![
            Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Submitted,
                None,
            ))),
            Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Working,
                None,
            ))),
        ]);
        Box::pin(lead.chain(self.inner.execute(context)))
    }
}
