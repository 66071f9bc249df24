//! Process-wide cancellation and connection tracking.

use dashmap::DashSet;

/// Explicit owner of the two process-wide id sets consulted during
/// execution: which context ids are cancelled, and which have an active
/// connection. Entries are added on cancel-request or connection-open and
/// removed on completion; all removals are idempotent (removing a non-member
/// is a no-op), which is what resolves cancel/complete races.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    cancellations: DashSet<String>,
    connections: DashSet<String>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_cancelled(&self, id: &str) {
        self.cancellations.insert(id.to_string());
    }

    pub fn clear_cancelled(&self, id: &str) {
        self.cancellations.remove(id);
    }

    #[must_use]
    pub fn is_cancelled(&self, id: &str) -> bool {
        self.cancellations.contains(id)
    }

    pub fn add_connection(&self, id: &str) {
        self.connections.insert(id.to_string());
    }

    pub fn remove_connection(&self, id: &str) {
        self.connections.remove(id);
    }

    #[must_use]
    pub fn has_connection(&self, id: &str) -> bool {
        self.connections.contains(id)
    }
}
