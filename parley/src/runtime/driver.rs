//! The execution driver: pumps an engine's update stream through the
//! lifecycle hooks.

use std::sync::Arc;

use futures::StreamExt;

use crate::engine::Engine;
use crate::errors::ServerResult;
use crate::runtime::ExecutionContext;

/// Drives `engine` for `context` to completion.
///
/// Guarantees:
/// - updates are reconciled strictly sequentially, in production order;
/// - cancellation (registry flag or abort signal) is checked before each
///   update; once observed, the in-flight update becomes the cancel payload
///   and the engine is not pumped further;
/// - any failure is funneled through the error hook and then returned to the
///   caller;
/// - the completion hook runs exactly once per execution, in all outcomes.
pub async fn execute(engine: &dyn Engine, context: &Arc<ExecutionContext>) -> ServerResult<()> {
    let result = drive(engine, context).await;
    if let Err(error) = &result {
        context.events().notify_error(error).await;
    }
    context.events().notify_complete().await;
    result
}

async fn drive(engine: &dyn Engine, context: &Arc<ExecutionContext>) -> ServerResult<()> {
    context.events().notify_start().await?;

    let mut updates = engine.execute(Arc::clone(context));
    while let Some(item) = updates.next().await {
        let update = item?;
        if context.is_cancelled() || context.signal().is_aborted() {
            context.events().notify_cancel(update).await?;
            break;
        }
        context.events().notify_update(update).await?;
    }
    Ok(())
}
