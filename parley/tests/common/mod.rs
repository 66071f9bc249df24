//! Shared fixtures for the integration tests: message builders, seeded task
//! aggregates, and scripted engines.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;

use parley::a2a::{
    Artifact, Message, MessageRole, MessageSendParams, Part, Task, TaskState, TaskStatus, Update,
    MESSAGE_KIND, TASK_KIND,
};
use parley::runtime::status;
use parley::{Engine, ExecutionContext, TaskAndHistory, UpdateStream};

pub fn user_message(text: &str) -> Message {
    Message {
        kind: MESSAGE_KIND.to_string(),
        message_id: uuid_like(text),
        role: MessageRole::User,
        parts: vec![Part::text(text)],
        context_id: None,
        task_id: None,
        reference_task_ids: Vec::new(),
        extensions: Vec::new(),
        metadata: None,
    }
}

// Deterministic per-text id keeps assertions readable.
fn uuid_like(seed: &str) -> String {
    format!("msg-{seed}")
}

pub fn send_params(message: Message) -> MessageSendParams {
    MessageSendParams {
        message,
        configuration: None,
        metadata: None,
    }
}

pub fn artifact(id: &str, text: &str) -> Artifact {
    Artifact {
        artifact_id: id.to_string(),
        parts: vec![Part::text(text)],
        name: None,
        description: None,
        extensions: Vec::new(),
        metadata: None,
    }
}

/// A stored aggregate in the given state, as if a prior execution left it.
pub fn seeded_task(id: &str, context_id: &str, state: TaskState) -> TaskAndHistory {
    TaskAndHistory {
        task: Task {
            kind: TASK_KIND.to_string(),
            id: id.to_string(),
            context_id: context_id.to_string(),
            status: TaskStatus {
                state,
                timestamp: Some("2024-06-01T12:00:00+00:00".to_string()),
                message: None,
            },
            history: Vec::new(),
            artifacts: Vec::new(),
            metadata: None,
        },
        history: Vec::new(),
    }
}

/// Engine that immediately reports completion.
pub struct ImmediateCompleter;

impl Engine for ImmediateCompleter {
    fn execute(&self, context: Arc<ExecutionContext>) -> UpdateStream {
        Box::pin(stream! {
            yield Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Completed,
                None,
            )));
        })
    }
}

/// Engine that emits one artifact and then completes.
pub struct ArtifactProducer;

impl Engine for ArtifactProducer {
    fn execute(&self, context: Arc<ExecutionContext>) -> UpdateStream {
        Box::pin(stream! {
            yield Ok(Update::ArtifactUpdate(parley::a2a::TaskArtifactUpdateEvent {
                kind: parley::a2a::ARTIFACT_UPDATE_KIND.to_string(),
                task_id: context.task_id().to_string(),
                context_id: context.context_id().to_string(),
                artifact: artifact("report", "artifact body"),
                append: None,
                last_chunk: Some(true),
                metadata: None,
            }));
            yield Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Completed,
                None,
            )));
        })
    }
}

/// Engine that fails on its first update.
pub struct FailingEngine;

impl Engine for FailingEngine {
    fn execute(&self, _context: Arc<ExecutionContext>) -> UpdateStream {
        Box::pin(stream! {
            yield Err(parley::ServerError::Engine {
                reason: "engine exploded".to_string(),
            });
        })
    }
}

/// Engine that reports `working`, then idles until its context is cancelled,
/// then emits once more so the driver gets a poll point to observe the flag.
pub struct CancellableEngine;

impl Engine for CancellableEngine {
    fn execute(&self, context: Arc<ExecutionContext>) -> UpdateStream {
        Box::pin(stream! {
            yield Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Working,
                None,
            )));
            for _ in 0..1000 {
                if context.is_cancelled() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            yield Ok(Update::StatusUpdate(status::status_event(
                context.task_id(),
                context.context_id(),
                TaskState::Working,
                None,
            )));
        })
    }
}
