//! The plugin capability contract.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::message::{Request, Response};
use crate::pipeline::PluginError;

/// Outcome of a pipeline invocation.
pub type PluginResult = Result<Response, PluginError>;

/// Deferred outcome of a pipeline invocation.
pub type PluginFuture = BoxFuture<'static, PluginResult>;

/// Continuation handed to a plugin: `next` proceeds to the following stage,
/// `first` restarts the pipeline.
pub type Next = Arc<dyn Fn(Request) -> PluginFuture + Send + Sync>;

/// One stage of an HTTP client pipeline.
pub trait Plugin: Send + Sync {
    /// Identity recorded in traces.
    fn name(&self) -> &str;

    /// Handle `request`, usually by calling `next` and post-processing the
    /// response.
    fn handle_request(&self, request: Request, next: Next, first: Next) -> PluginFuture;
}

/// Wrap a closure as a [`Next`] continuation.
pub fn next_fn<F>(f: F) -> Next
where
    F: Fn(Request) -> PluginFuture + Send + Sync + 'static,
{
    Arc::new(f)
}
