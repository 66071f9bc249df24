//! Execution lifecycle: typed notifications and the per-execution manager.
//!
//! [`LifecycleBus`] fans typed [`LifecycleEvent`]s out to observers (the
//! stream adapter, completion watchers) without those observers being the
//! execution driver. [`EventManager`] owns the current task aggregate and
//! dispatches the five lifecycle hooks, publishing a notification after each.

pub mod hooks;
pub mod lifecycle;
pub mod manager;

pub use hooks::{A2aExecutionHooks, ExecutionHooks};
pub use lifecycle::{LifecycleBus, LifecycleEvent, LifecycleReceiver};
pub use manager::EventManager;
