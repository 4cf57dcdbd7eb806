//! Decorator recording a single plugin invocation as a Profile.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::future::{self, FutureExt};

use crate::collector::collector::Collector;
use crate::collector::profile::Profile;
use crate::collector::types::{panic_message, report_fault, TraceError};
use crate::message::{Formatter, Request};
use crate::observability::metrics;
use crate::pipeline::{Next, Plugin, PluginError, PluginFuture, PluginResult};

/// Wraps one plugin and appends a Profile to the active Stack each time it
/// runs.
///
/// Must run inside a [`StackPlugin`](crate::collector::StackPlugin); without
/// an active stack the invocation fails with [`TraceError::NoActiveStack`]
/// and the wrapped plugin is not called.
pub struct ProfilePlugin {
    inner: Arc<dyn Plugin>,
    collector: Arc<Collector>,
    formatter: Arc<dyn Formatter>,
}

impl ProfilePlugin {
    pub fn new(
        inner: Arc<dyn Plugin>,
        collector: Arc<Collector>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            inner,
            collector,
            formatter,
        }
    }
}

impl Plugin for ProfilePlugin {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn handle_request(&self, request: Request, next: Next, first: Next) -> PluginFuture {
        let plugin = self.inner.name().to_string();
        let formatted = self.formatter.format_request(&request);

        let stack = match self.collector.active_stack() {
            Some(stack) => stack,
            None => {
                let error = TraceError::NoActiveStack(plugin);
                tracing::error!(error = %error, "Profiled plugin invoked outside of a stack");
                metrics::record_internal_fault("no_active_stack");
                let result: PluginResult = Err(PluginError::from(error));
                return Box::pin(future::ready(result));
            }
        };

        let profile = Arc::new(Profile::new(plugin, formatted));
        stack.add_profile(profile.clone());
        tracing::debug!(plugin = %profile.plugin(), stack_id = %stack.id(), "Profile started");

        let inner = self.inner.clone();
        let pending = match panic::catch_unwind(AssertUnwindSafe(|| {
            inner.handle_request(request, next, first)
        })) {
            Ok(pending) => pending,
            Err(payload) => {
                reject_on_fault(self.formatter.as_ref(), &profile, &*payload);
                panic::resume_unwind(payload)
            }
        };

        let formatter = self.formatter.clone();
        Box::pin(async move {
            match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(Ok(response)) => {
                    report_fault(profile.fulfill(formatter.format_response(&response)));
                    settled(&profile);
                    Ok(response)
                }
                Ok(Err(error)) => {
                    report_fault(profile.reject(formatter.format_failure(&error)));
                    settled(&profile);
                    Err(error)
                }
                Err(payload) => {
                    reject_on_fault(formatter.as_ref(), &profile, &*payload);
                    panic::resume_unwind(payload)
                }
            }
        })
    }
}

fn reject_on_fault(formatter: &dyn Formatter, profile: &Profile, payload: &(dyn Any + Send)) {
    let message = panic_message(payload);
    report_fault(profile.reject(formatter.format_fault(&message)));
    settled(profile);
}

fn settled(profile: &Profile) {
    let outcome = profile.outcome();
    metrics::record_profile(profile.plugin(), outcome.label());
    tracing::debug!(plugin = %profile.plugin(), outcome = outcome.label(), "Profile settled");
}
