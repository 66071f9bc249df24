//! Translates internal errors into A2A JSON-RPC error payloads.

use a2a_types::{
    ContentTypeNotSupportedError, InternalError, InvalidAgentResponseError, InvalidParamsError,
    JSONRPCError, PushNotificationNotSupportedError, TaskNotCancelableError, TaskNotFoundError,
    UnsupportedOperationError,
};
use serde_json::json;

use crate::errors::ServerError;

/// Maps a [`ServerError`] into an A2A-compliant [`JSONRPCError`].
///
/// Keeping protocol wiring out of the execution path means the core only
/// deals in domain errors; transports call this at their boundary.
#[must_use]
pub fn to_jsonrpc_error(error: ServerError) -> JSONRPCError {
    match error {
        ServerError::TaskNotFound { task_id } => {
            let defaults = TaskNotFoundError::default();
            JSONRPCError {
                code: defaults.code,
                message: format!("Task not found: {task_id}"),
                data: Some(json!({ "taskId": task_id })),
            }
        }
        ServerError::TaskNotCancelable { task_id, state } => {
            let defaults = TaskNotCancelableError::default();
            JSONRPCError {
                code: defaults.code,
                message: format!("Task cannot be canceled: {task_id}"),
                data: Some(json!({ "taskId": task_id, "state": state })),
            }
        }
        ServerError::PushNotificationNotSupported => {
            let defaults = PushNotificationNotSupportedError::default();
            JSONRPCError {
                code: defaults.code,
                message: defaults.message,
                data: None,
            }
        }
        ServerError::UnsupportedOperation { operation } => {
            let defaults = UnsupportedOperationError::default();
            JSONRPCError {
                code: defaults.code,
                message: format!("This operation is not supported: {operation}"),
                data: Some(json!({ "operation": operation })),
            }
        }
        ServerError::ContentTypeNotSupported { reason } => {
            let defaults = ContentTypeNotSupportedError::default();
            JSONRPCError {
                code: defaults.code,
                message: defaults.message,
                data: Some(json!({ "reason": reason })),
            }
        }
        ServerError::InvalidAgentResponse { reason } => {
            let defaults = InvalidAgentResponseError::default();
            JSONRPCError {
                code: defaults.code,
                message: defaults.message,
                data: Some(json!({ "reason": reason })),
            }
        }
        ServerError::InvalidParams(message) => {
            let defaults = InvalidParamsError::default();
            JSONRPCError {
                code: defaults.code,
                message,
                data: None,
            }
        }
        other => {
            let defaults = InternalError::default();
            JSONRPCError {
                code: defaults.code,
                message: defaults.message,
                data: Some(json!({ "details": other.to_string() })),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::TaskState;

    #[test]
    fn task_not_found_maps_to_protocol_code() {
        let err = to_jsonrpc_error(ServerError::TaskNotFound {
            task_id: "missing".into(),
        });
        assert_eq!(err.code, -32001);
        assert!(err.message.contains("missing"));
        assert_eq!(err.data.unwrap()["taskId"], "missing");
    }

    #[test]
    fn task_not_cancelable_maps_to_protocol_code() {
        let err = to_jsonrpc_error(ServerError::TaskNotCancelable {
            task_id: "t1".into(),
            state: TaskState::Completed,
        });
        assert_eq!(err.code, -32002);
        assert_eq!(err.data.unwrap()["state"], "completed");
    }

    #[test]
    fn invalid_params_carries_the_given_message() {
        let err = to_jsonrpc_error(ServerError::InvalidParams("bad message".into()));
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "bad message");
    }

    #[test]
    fn everything_else_maps_to_internal_error() {
        let err = to_jsonrpc_error(ServerError::Engine {
            reason: "boom".into(),
        });
        assert_eq!(err.code, -32603);
        assert!(err.data.unwrap()["details"].as_str().unwrap().contains("boom"));
    }
}
