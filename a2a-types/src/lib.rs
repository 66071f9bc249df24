//! # A2A (Agent2Agent) Protocol Types
//!
//! Rust data structures for the Agent2Agent (A2A) task protocol, derived from
//! the protocol's JSON Schema and designed for serialization and
//! deserialization with `serde`. Field names are wire-exact: the schema's
//! camelCase identifiers are mapped via `serde(rename)` so serialized output
//! is byte-compatible with other protocol implementations.
//!
//! The central structures are:
//! - [`Task`] — the durable unit of work, with status, history and artifacts.
//! - [`Message`] — one conversational turn, composed of [`Part`]s.
//! - [`Update`] — the union of incremental events a task execution produces.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `kind` discriminator carried by a standalone [`Message`].
pub const MESSAGE_KIND: &str = "message";
/// `kind` discriminator carried by a [`Task`] snapshot.
pub const TASK_KIND: &str = "task";
/// `kind` discriminator carried by a [`TaskStatusUpdateEvent`].
pub const STATUS_UPDATE_KIND: &str = "status-update";
/// `kind` discriminator carried by a [`TaskArtifactUpdateEvent`].
pub const ARTIFACT_UPDATE_KIND: &str = "artifact-update";

// ============================================================================
// Core Protocol Types
// ============================================================================

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    AuthRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
    Unknown,
}

impl TaskState {
    /// Whether the state is terminal: no further status or artifact updates
    /// may apply once it is reached. `Unknown` is deliberately not terminal.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Canceled | Self::Failed | Self::Rejected
        )
    }
}

/// Status of a task at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    /// ISO 8601 datetime. Informational on inbound events; the server is the
    /// timestamp authority for persisted state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// The durable, identifiable unit of agent work.
///
/// `id` and `context_id` are immutable for the task's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Always [`TASK_KIND`].
    pub kind: String,
    pub id: String,
    #[serde(rename = "contextId")]
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// One turn in the conversation between user and agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Always [`MESSAGE_KIND`].
    pub kind: String,
    /// Unique per message; used for de-duplication in task history.
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub role: MessageRole,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "contextId")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        rename = "referenceTaskIds"
    )]
    pub reference_task_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// One independently discriminated content element of a message or artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    File {
        file: FileContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    Data {
        data: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
}

impl Part {
    /// Convenience constructor for a plain text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            metadata: None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// File payload of a [`Part::File`], either inline bytes or by reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FileContent {
    WithBytes(FileWithBytes),
    WithUri(FileWithUri),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileWithBytes {
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base64-encoded content.
    pub bytes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileWithUri {
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uri: String,
}

/// A named, identified output of a task, addressable by `artifact_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

// ============================================================================
// Streaming Event Types
// ============================================================================

/// Event describing a change of a task's status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatusUpdateEvent {
    /// Always [`STATUS_UPDATE_KIND`].
    pub kind: String,
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "contextId")]
    pub context_id: String,
    pub status: TaskStatus,
    /// Whether this is the last status event the execution will produce.
    #[serde(rename = "final")]
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Event carrying a new or updated artifact of a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskArtifactUpdateEvent {
    /// Always [`ARTIFACT_UPDATE_KIND`].
    pub kind: String,
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "contextId")]
    pub context_id: String,
    pub artifact: Artifact,
    /// When true, `artifact.parts` extend the already-known artifact with the
    /// same id instead of replacing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "lastChunk")]
    pub last_chunk: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// One incremental event produced by a task execution, discriminated by the
/// `kind` field each variant carries on the wire.
///
/// Untagged deserialization relies on the variants' disjoint required fields
/// (`final` for status events, `artifact` for artifact events, `id` for task
/// snapshots, `messageId` for messages).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Update {
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
    Task(Task),
    Message(Message),
}

impl Update {
    /// The `kind` discriminator string of the wrapped event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => STATUS_UPDATE_KIND,
            Self::ArtifactUpdate(_) => ARTIFACT_UPDATE_KIND,
            Self::Task(_) => TASK_KIND,
            Self::Message(_) => MESSAGE_KIND,
        }
    }

    /// The task id the event refers to, when it carries one.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::StatusUpdate(update) => Some(&update.task_id),
            Self::ArtifactUpdate(update) => Some(&update.task_id),
            Self::Task(task) => Some(&task.id),
            Self::Message(message) => message.task_id.as_deref(),
        }
    }

    /// The context id the event refers to, when it carries one.
    #[must_use]
    pub fn context_id(&self) -> Option<&str> {
        match self {
            Self::StatusUpdate(update) => Some(&update.context_id),
            Self::ArtifactUpdate(update) => Some(&update.context_id),
            Self::Task(task) => Some(&task.context_id),
            Self::Message(message) => message.context_id.as_deref(),
        }
    }
}

// ============================================================================
// Method Parameter Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageSendConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        rename = "acceptedOutputModes"
    )]
    pub accepted_output_modes: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "pushNotificationConfig"
    )]
    pub push_notification_config: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<PushNotificationAuthenticationInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationAuthenticationInfo {
    pub schemes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPushNotificationConfig {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "pushNotificationConfig")]
    pub push_notification_config: PushNotificationConfig,
}

// ============================================================================
// Method Result Types
// ============================================================================

/// Result of a blocking `message/send` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}

/// One item of a `message/stream` or `tasks/resubscribe` event sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendStreamingMessageResult {
    TaskStatusUpdate(TaskStatusUpdateEvent),
    TaskArtifactUpdate(TaskArtifactUpdateEvent),
    Task(Task),
    Message(Message),
}

impl From<Update> for SendStreamingMessageResult {
    fn from(update: Update) -> Self {
        match update {
            Update::StatusUpdate(event) => Self::TaskStatusUpdate(event),
            Update::ArtifactUpdate(event) => Self::TaskArtifactUpdate(event),
            Update::Task(task) => Self::Task(task),
            Update::Message(message) => Self::Message(message),
        }
    }
}

// ============================================================================
// JSON-RPC Error Types
// ============================================================================

/// A JSON-RPC 2.0 error object as surfaced to protocol callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// JSON payload could not be parsed. Code `-32700`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JSONParseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for JSONParseError {
    fn default() -> Self {
        Self {
            code: -32700,
            message: "Invalid JSON payload".to_string(),
            data: None,
        }
    }
}

/// Request payload failed validation. Code `-32600`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidRequestError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for InvalidRequestError {
    fn default() -> Self {
        Self {
            code: -32600,
            message: "Request payload validation error".to_string(),
            data: None,
        }
    }
}

/// Requested method does not exist. Code `-32601`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodNotFoundError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for MethodNotFoundError {
    fn default() -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: None,
        }
    }
}

/// Method parameters are invalid. Code `-32602`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidParamsError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for InvalidParamsError {
    fn default() -> Self {
        Self {
            code: -32602,
            message: "Invalid parameters".to_string(),
            data: None,
        }
    }
}

/// Internal server error. Code `-32603`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for InternalError {
    fn default() -> Self {
        Self {
            code: -32603,
            message: "Internal error".to_string(),
            data: None,
        }
    }
}

/// Referenced task does not exist. Code `-32001`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNotFoundError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for TaskNotFoundError {
    fn default() -> Self {
        Self {
            code: -32001,
            message: "Task not found".to_string(),
            data: None,
        }
    }
}

/// Task is in a state that does not permit cancellation. Code `-32002`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNotCancelableError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for TaskNotCancelableError {
    fn default() -> Self {
        Self {
            code: -32002,
            message: "Task cannot be canceled".to_string(),
            data: None,
        }
    }
}

/// Push notifications are not supported by this server. Code `-32003`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushNotificationNotSupportedError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for PushNotificationNotSupportedError {
    fn default() -> Self {
        Self {
            code: -32003,
            message: "Push Notification is not supported".to_string(),
            data: None,
        }
    }
}

/// Operation is not supported by this server. Code `-32004`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsupportedOperationError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for UnsupportedOperationError {
    fn default() -> Self {
        Self {
            code: -32004,
            message: "This operation is not supported".to_string(),
            data: None,
        }
    }
}

/// Requested content types are incompatible. Code `-32005`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeNotSupportedError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for ContentTypeNotSupportedError {
    fn default() -> Self {
        Self {
            code: -32005,
            message: "Incompatible content types".to_string(),
            data: None,
        }
    }
}

/// Agent produced a response the server could not interpret. Code `-32006`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidAgentResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Default for InvalidAgentResponseError {
    fn default() -> Self {
        Self {
            code: -32006,
            message: "Invalid agent response".to_string(),
            data: None,
        }
    }
}
