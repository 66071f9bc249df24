//! Bridges a push-driven execution to a pull-based update sequence.

use std::sync::Arc;

use async_stream::stream;

use a2a_types::Update;

use crate::engine::{Engine, UpdateStream};
use crate::events::LifecycleEvent;
use crate::runtime::{driver, ExecutionContext};

/// Runs `engine` in the background and returns the execution as a pull-based
/// sequence of updates.
///
/// The consumer sees reconciled updates in production order. With
/// `emit_final_snapshot` the terminal task state is appended as one more
/// item of the same sequence — there is no separate done signal. A driver
/// failure is surfaced to the consumer exactly once, as the stream's last
/// item, carrying the typed error from the execution's join.
pub fn stream_execution(
    engine: Arc<dyn Engine>,
    context: Arc<ExecutionContext>,
    emit_final_snapshot: bool,
) -> UpdateStream {
    Box::pin(stream! {
        // Subscribe before the driver starts so no notification is missed.
        let mut events = context.events().subscribe().await;

        let execution = tokio::spawn({
            let engine = Arc::clone(&engine);
            let context = Arc::clone(&context);
            async move { driver::execute(engine.as_ref(), &context).await }
        });

        while let Some(event) = events.recv().await {
            match event {
                LifecycleEvent::Update(update) => yield Ok(update),
                // The typed error is surfaced below from the join; the
                // notification only ends the relay loop.
                LifecycleEvent::Error(_) | LifecycleEvent::Complete => break,
                _ => {}
            }
        }

        match execution.await {
            Ok(Ok(())) => {
                if emit_final_snapshot {
                    if let Some(task) = context.current_task().await {
                        yield Ok(Update::Task(task));
                    }
                }
            }
            Ok(Err(error)) => yield Err(error),
            Err(join_error) => yield Err(join_error.into()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ServerError, ServerResult};
    use crate::events::A2aExecutionHooks;
    use crate::runtime::{status, SessionRegistry};
    use crate::task::{InMemoryTaskStore, TaskStore};
    use a2a_types::{Message, MessageRole, Part, TaskState, MESSAGE_KIND};
    use futures::StreamExt;
    use std::sync::Mutex;

    fn user_message() -> Message {
        Message {
            kind: MESSAGE_KIND.to_string(),
            message_id: "msg-1".to_string(),
            role: MessageRole::User,
            parts: vec![Part::text("hello")],
            context_id: Some("ctx-1".to_string()),
            task_id: Some("task-1".to_string()),
            reference_task_ids: Vec::new(),
            extensions: Vec::new(),
            metadata: None,
        }
    }

    fn execution_context(store: Arc<InMemoryTaskStore>) -> Arc<ExecutionContext> {
        let registry = Arc::new(SessionRegistry::new());
        let hooks = A2aExecutionHooks::new(
            store,
            Arc::clone(&registry),
            "task-1".to_string(),
            "ctx-1".to_string(),
            user_message(),
            None,
        );
        Arc::new(ExecutionContext::new(
            "task-1".to_string(),
            "ctx-1".to_string(),
            user_message(),
            None,
            registry,
            Box::new(hooks),
        ))
    }

    struct ScriptedEngine {
        updates: Mutex<Option<Vec<ServerResult<Update>>>>,
    }

    impl ScriptedEngine {
        fn new(updates: Vec<ServerResult<Update>>) -> Self {
            Self {
                updates: Mutex::new(Some(updates)),
            }
        }
    }

    impl Engine for ScriptedEngine {
        fn execute(&self, _context: Arc<ExecutionContext>) -> UpdateStream {
            let updates = self.updates.lock().unwrap().take().unwrap_or_default();
            Box::pin(futures::stream::iter(updates))
        }
    }

    #[tokio::test]
    async fn relays_updates_in_order_then_appends_final_task() {
        let store = Arc::new(InMemoryTaskStore::new());
        let context = execution_context(Arc::clone(&store));
        let engine: Arc<dyn Engine> = Arc::new(ScriptedEngine::new(vec![
            Ok(Update::StatusUpdate(status::status_event(
                "task-1",
                "ctx-1",
                TaskState::Working,
                None,
            ))),
            Ok(Update::StatusUpdate(status::status_event(
                "task-1",
                "ctx-1",
                TaskState::Completed,
                None,
            ))),
        ]));

        let items: Vec<_> = stream_execution(engine, context, true).collect().await;
        assert_eq!(items.len(), 3);

        match &items[0] {
            Ok(Update::StatusUpdate(event)) => assert_eq!(event.status.state, TaskState::Working),
            other => panic!("expected working status, got {other:?}"),
        }
        match &items[1] {
            Ok(Update::StatusUpdate(event)) => {
                assert_eq!(event.status.state, TaskState::Completed);
            }
            other => panic!("expected completed status, got {other:?}"),
        }
        match &items[2] {
            Ok(Update::Task(task)) => assert_eq!(task.status.state, TaskState::Completed),
            other => panic!("expected terminal task snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn driver_failure_is_surfaced_exactly_once() {
        let store = Arc::new(InMemoryTaskStore::new());
        let context = execution_context(Arc::clone(&store));
        let engine: Arc<dyn Engine> = Arc::new(ScriptedEngine::new(vec![
            Ok(Update::StatusUpdate(status::status_event(
                "task-1",
                "ctx-1",
                TaskState::Working,
                None,
            ))),
            Err(ServerError::Engine {
                reason: "boom".to_string(),
            }),
        ]));

        let items: Vec<_> = stream_execution(engine, context, true).collect().await;

        let errors = items.iter().filter(|item| item.is_err()).count();
        assert_eq!(errors, 1, "error must reach the consumer exactly once");
        assert!(matches!(
            items.last(),
            Some(Err(ServerError::Engine { .. }))
        ));

        // The failure was persisted as a failed status before surfacing.
        let stored = store.load("task-1").await.expect("load").expect("saved");
        assert_eq!(stored.task.status.state, TaskState::Failed);
    }

    #[tokio::test]
    async fn without_snapshot_flag_the_stream_ends_on_completion() {
        let store = Arc::new(InMemoryTaskStore::new());
        let context = execution_context(store);
        let engine: Arc<dyn Engine> = Arc::new(ScriptedEngine::new(vec![Ok(
            Update::StatusUpdate(status::status_event(
                "task-1",
                "ctx-1",
                TaskState::Completed,
                None,
            )),
        )]));

        let items: Vec<_> = stream_execution(engine, context, false).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Ok(Update::StatusUpdate(_))));
    }
}
