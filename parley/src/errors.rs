use a2a_types::TaskState;

/// Main error type for the execution core.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    // === Protocol Errors ===
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Task cannot be canceled: {task_id} is in state {state:?}")]
    TaskNotCancelable { task_id: String, state: TaskState },

    #[error("Push notifications are not supported")]
    PushNotificationNotSupported,

    #[error("Operation not supported: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("Incompatible content types: {reason}")]
    ContentTypeNotSupported { reason: String },

    #[error("Invalid agent response: {reason}")]
    InvalidAgentResponse { reason: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    // === Reconciliation Errors ===
    #[error("Invalid update event: {reason}")]
    InvalidUpdate { reason: String },

    // === Engine/Execution Errors ===
    #[error("Engine failure: {reason}")]
    Engine { reason: String },

    // === Store Errors ===
    #[error("Store operation failed: {operation}: {reason}")]
    Store { operation: String, reason: String },

    // === General System Errors ===
    #[error("Serialization error: {format}: {reason}")]
    Serialization { format: String, reason: String },

    #[error("Internal error: {component}: {reason}")]
    Internal { component: String, reason: String },
}

/// Convenience type alias
pub type ServerResult<T> = std::result::Result<T, ServerError>;

impl From<serde_json::Error> for ServerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            format: "json".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(error: std::io::Error) -> Self {
        Self::Internal {
            component: "io".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(error: tokio::task::JoinError) -> Self {
        let reason = if error.is_cancelled() {
            "execution task cancelled".to_string()
        } else if error.is_panic() {
            "execution task panicked".to_string()
        } else {
            error.to_string()
        };

        Self::Internal {
            component: "execution".to_string(),
            reason,
        }
    }
}
