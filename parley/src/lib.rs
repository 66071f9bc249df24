//! Server-side execution core for the Agent2Agent (A2A) task protocol.
//!
//! `parley` drives a long-running, streamable unit of work (a [`Task`]) from
//! submission through intermediate status and artifact updates to a terminal
//! state. The caller supplies an [`Engine`] — an asynchronous producer of
//! [`Update`] events — and consumes the execution either blocking
//! ([`RequestHandler::send_message`]) or incrementally as an event stream
//! ([`RequestHandler::stream_message`]).
//!
//! [`Task`]: a2a_types::Task
//! [`Update`]: a2a_types::Update
//! [`Engine`]: engine::Engine
//! [`RequestHandler::send_message`]: runtime::RequestHandler::send_message
//! [`RequestHandler::stream_message`]: runtime::RequestHandler::stream_message

pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod runtime;
pub mod task;

pub use a2a_types as a2a;

pub use engine::{Engine, UpdateStream};
pub use errors::{ServerError, ServerResult};
pub use runtime::{ExecutionContext, RequestHandler, SessionRegistry};
pub use task::{InMemoryTaskStore, TaskAndHistory, TaskStore};
