//! The execution runtime: contexts, driver, stream adapter and the protocol
//! method surface.
//!
//! A request enters through [`RequestHandler`], which resolves ids, installs
//! the per-request lifecycle hooks and hands the execution to the
//! [`driver`]. The [`stream`] adapter turns that push-driven execution into
//! a pull-based update sequence for streaming consumers.

pub mod context;
pub mod driver;
pub mod error_mapper;
pub mod handler;
pub mod registry;
pub mod status;
pub mod stream;

pub use context::{AbortSignal, ExecutionContext};
pub use error_mapper::to_jsonrpc_error;
pub use handler::RequestHandler;
pub use registry::SessionRegistry;
