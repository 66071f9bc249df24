//! The engine contract: the caller-supplied producer of task updates.

use std::pin::Pin;
use std::sync::Arc;

use a2a_types::Update;
use futures::Stream;

use crate::errors::ServerResult;
use crate::runtime::ExecutionContext;

/// Sequence of updates produced by an engine. An `Err` item models an engine
/// failure; the driver stops pumping and funnels it through the error hook.
pub type UpdateStream = Pin<Box<dyn Stream<Item = ServerResult<Update>> + Send>>;

/// An asynchronous producer of [`Update`] events performing the actual agent
/// work for one request.
///
/// Engines read the inbound message and ids from the [`ExecutionContext`] and
/// may fetch the current task snapshot via
/// [`ExecutionContext::current_task`]. Once the task has reached a final
/// state the engine must stop producing updates; the driver additionally
/// checks [`ExecutionContext::is_cancelled`] before reconciling each one.
pub trait Engine: Send + Sync {
    fn execute(&self, context: Arc<ExecutionContext>) -> UpdateStream;
}
