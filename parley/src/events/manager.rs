//! Per-execution lifecycle controller.

use tokio::sync::Mutex;
use tracing::error;

use a2a_types::{Task, Update};

use crate::errors::{ServerError, ServerResult};
use crate::events::{ExecutionHooks, LifecycleBus, LifecycleEvent, LifecycleReceiver};
use crate::task::TaskAndHistory;

/// Owns the current task aggregate of one execution and dispatches its
/// lifecycle: each `notify_*` invokes the configured hook, applies the
/// returned state, then publishes the matching [`LifecycleEvent`] so
/// observers (the stream adapter, completion watchers) get push notification
/// without being the driver.
pub struct EventManager {
    current: Mutex<Option<TaskAndHistory>>,
    hooks: Box<dyn ExecutionHooks>,
    bus: LifecycleBus,
}

impl EventManager {
    #[must_use]
    pub fn new(hooks: Box<dyn ExecutionHooks>) -> Self {
        Self {
            current: Mutex::new(None),
            hooks,
            bus: LifecycleBus::new(),
        }
    }

    /// Snapshot of the current aggregate, if the execution has started.
    pub async fn current(&self) -> Option<TaskAndHistory> {
        self.current.lock().await.clone()
    }

    /// Snapshot of the current task, if the execution has started.
    pub async fn current_task(&self) -> Option<Task> {
        self.current.lock().await.as_ref().map(|data| data.task.clone())
    }

    /// Subscribes to this execution's lifecycle notifications.
    pub async fn subscribe(&self) -> LifecycleReceiver {
        self.bus.subscribe().await
    }

    pub async fn notify_start(&self) -> ServerResult<()> {
        let state = self.hooks.on_start().await?;
        let task_id = state.task.id.clone();
        *self.current.lock().await = Some(state);
        self.bus.publish(&LifecycleEvent::Start { task_id }).await;
        Ok(())
    }

    /// Routes one update through the update hook. The update notification is
    /// only published when the hook actually accepted the update; a dropped
    /// update (in-flight cancellation) is invisible to observers.
    pub async fn notify_update(&self, update: Update) -> ServerResult<()> {
        let snapshot = self.current.lock().await.clone();
        let Some(current) = snapshot else {
            return Err(ServerError::Internal {
                component: "events".to_string(),
                reason: "update received before execution start".to_string(),
            });
        };

        match self.hooks.on_update(current, update.clone()).await? {
            Some(next) => {
                *self.current.lock().await = Some(next);
                self.bus.publish(&LifecycleEvent::Update(update)).await;
            }
            None => {}
        }
        Ok(())
    }

    pub async fn notify_cancel(&self, update: Update) -> ServerResult<()> {
        let snapshot = self.current.lock().await.clone();
        if let Some(next) = self.hooks.on_cancel(snapshot, update.clone()).await? {
            *self.current.lock().await = Some(next);
        }
        self.bus.publish(&LifecycleEvent::Cancel(update)).await;
        Ok(())
    }

    /// Never fails: a failing error hook is logged, and the error
    /// notification is published regardless so consumers observe the failure.
    pub async fn notify_error(&self, error: &ServerError) {
        let snapshot = self.current.lock().await.clone();
        match self.hooks.on_error(snapshot, error).await {
            Ok(Some(next)) => *self.current.lock().await = Some(next),
            Ok(None) => {}
            Err(hook_err) => {
                error!(error = %hook_err, "error hook failed");
            }
        }
        self.bus
            .publish(&LifecycleEvent::Error(error.to_string()))
            .await;
    }

    pub async fn notify_complete(&self) {
        if let Err(err) = self.hooks.on_complete().await {
            error!(error = %err, "completion hook failed");
        }
        self.bus.publish(&LifecycleEvent::Complete).await;
    }
}
