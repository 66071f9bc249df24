//! Helpers for constructing protocol status events.

use chrono::Utc;

use a2a_types::{
    Message, TaskState, TaskStatus, TaskStatusUpdateEvent, STATUS_UPDATE_KIND,
};

/// Current UTC time in RFC 3339 format, the protocol's timestamp format.
#[must_use]
pub fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Builds a status update event for the given task. `final` is derived from
/// the state's terminality.
#[must_use]
pub fn status_event(
    task_id: &str,
    context_id: &str,
    state: TaskState,
    message: Option<Message>,
) -> TaskStatusUpdateEvent {
    TaskStatusUpdateEvent {
        kind: STATUS_UPDATE_KIND.to_string(),
        task_id: task_id.to_string(),
        context_id: context_id.to_string(),
        status: TaskStatus {
            state,
            timestamp: Some(now()),
            message,
        },
        is_final: state.is_final(),
        metadata: None,
    }
}
