//! Per-request execution context shared between handler, driver and engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use a2a_types::{Message, Task};

use crate::events::{EventManager, ExecutionHooks};
use crate::runtime::SessionRegistry;

/// Caller-facing abort flag, checked by the driver before each update. An
/// aborted signal is a cancellation trigger alongside the registry flag; it
/// does not interrupt an in-flight engine step.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one task execution needs: the resolved ids, the inbound user
/// message, cancellation checks, and the lifecycle [`EventManager`].
///
/// Engines receive this as `Arc<ExecutionContext>` and read the message and
/// ids from it; the current task snapshot is available via
/// [`ExecutionContext::current_task`].
pub struct ExecutionContext {
    task_id: String,
    context_id: String,
    user_message: Message,
    metadata: Option<HashMap<String, serde_json::Value>>,
    registry: Arc<SessionRegistry>,
    signal: AbortSignal,
    events: EventManager,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(
        task_id: String,
        context_id: String,
        user_message: Message,
        metadata: Option<HashMap<String, serde_json::Value>>,
        registry: Arc<SessionRegistry>,
        hooks: Box<dyn ExecutionHooks>,
    ) -> Self {
        Self {
            task_id,
            context_id,
            user_message,
            metadata,
            registry,
            signal: AbortSignal::new(),
            events: EventManager::new(hooks),
        }
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    #[must_use]
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&HashMap<String, serde_json::Value>> {
        self.metadata.as_ref()
    }

    /// Whether this execution's context id has been marked cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.registry.is_cancelled(&self.context_id)
    }

    #[must_use]
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    #[must_use]
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Snapshot of the task as last reconciled, if execution has started.
    pub async fn current_task(&self) -> Option<Task> {
        self.events.current_task().await
    }
}
