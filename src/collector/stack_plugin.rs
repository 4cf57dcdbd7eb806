//! Decorator opening a Stack around a whole pipeline invocation.
//!
//! # Flow
//! ```text
//! handle_request
//!     → format request, build Stack, activate (push)
//!     → next(request)
//!     ← success: complete(format_response), pop, return response
//!     ← failure: fail(format_failure), pop, return error
//!     ← panic:   fail(format_fault), pop, resume unwinding
//! ```
//!
//! The caller observes exactly the outcome of `next`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;

use crate::collector::collector::{ActiveStackGuard, Collector};
use crate::collector::stack::Stack;
use crate::collector::types::{panic_message, report_fault};
use crate::message::{Formatter, Request};
use crate::observability::metrics;
use crate::pipeline::{Next, Plugin, PluginFuture};

/// Records one pipeline invocation of a named client as a Stack.
pub struct StackPlugin {
    collector: Arc<Collector>,
    formatter: Arc<dyn Formatter>,
    client: String,
}

impl StackPlugin {
    pub fn new(
        collector: Arc<Collector>,
        formatter: Arc<dyn Formatter>,
        client: impl Into<String>,
    ) -> Self {
        Self {
            collector,
            formatter,
            client: client.into(),
        }
    }

    pub fn client(&self) -> &str {
        &self.client
    }
}

impl Plugin for StackPlugin {
    fn name(&self) -> &str {
        "stack"
    }

    fn handle_request(&self, request: Request, next: Next, _first: Next) -> PluginFuture {
        let stack = Arc::new(
            Stack::new(self.client.clone(), self.formatter.format_request(&request))
                .describing(&request)
                .with_curl_command(self.formatter.format_as_curl_command(&request)),
        );
        let guard = self.collector.activate(stack.clone());
        tracing::debug!(
            client = %self.client,
            stack_id = %stack.id(),
            depth = self.collector.depth(),
            "Stack opened"
        );

        // `next` may panic before handing back a future.
        let pending = match panic::catch_unwind(AssertUnwindSafe(|| next(request))) {
            Ok(pending) => pending,
            Err(payload) => {
                close_on_fault(self.formatter.as_ref(), &stack, guard, &*payload);
                panic::resume_unwind(payload)
            }
        };

        let formatter = self.formatter.clone();
        Box::pin(async move {
            match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(Ok(response)) => {
                    stack.set_response_status(response.status().as_u16());
                    report_fault(stack.complete(formatter.format_response(&response)));
                    close(&stack, guard);
                    Ok(response)
                }
                Ok(Err(error)) => {
                    if let Some(response) = error.response() {
                        stack.set_response_status(response.status().as_u16());
                    }
                    report_fault(stack.fail(formatter.format_failure(&error)));
                    close(&stack, guard);
                    Err(error)
                }
                Err(payload) => {
                    close_on_fault(formatter.as_ref(), &stack, guard, &*payload);
                    panic::resume_unwind(payload)
                }
            }
        })
    }
}

fn close_on_fault(
    formatter: &dyn Formatter,
    stack: &Stack,
    guard: ActiveStackGuard,
    payload: &(dyn Any + Send),
) {
    let message = panic_message(payload);
    tracing::debug!(stack_id = %stack.id(), panic = %message, "Pipeline panicked");
    report_fault(stack.fail(formatter.format_fault(&message)));
    close(stack, guard);
}

fn close(stack: &Stack, guard: ActiveStackGuard) {
    report_fault(guard.release().map(|_| ()));
    metrics::record_stack(
        stack.client(),
        stack.is_failed(),
        stack.duration().unwrap_or_default(),
    );
    tracing::debug!(
        client = %stack.client(),
        stack_id = %stack.id(),
        failed = stack.is_failed(),
        profiles = stack.profiles().len(),
        "Stack closed"
    );
}
