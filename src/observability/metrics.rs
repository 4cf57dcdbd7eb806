//! Profiler metrics.
//!
//! # Metrics
//! - `profiler_stacks_total` (counter): closed stacks by client, outcome
//! - `profiler_stack_duration_seconds` (histogram): invocation latency by client
//! - `profiler_profiles_total` (counter): settled profiles by plugin, outcome
//! - `profiler_internal_faults_total` (counter): bookkeeping faults by kind
//!
//! Without an installed recorder every call is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::ObservabilityConfig;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Apply the metrics switch of the configuration.
pub fn init_metrics(config: &ObservabilityConfig) {
    ENABLED.store(config.metrics_enabled, Ordering::Relaxed);
}

fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn record_stack(client: &str, failed: bool, duration: Duration) {
    if !enabled() {
        return;
    }
    let outcome = if failed { "failed" } else { "succeeded" };
    metrics::counter!(
        "profiler_stacks_total",
        "client" => client.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("profiler_stack_duration_seconds", "client" => client.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_profile(plugin: &str, outcome: &'static str) {
    if !enabled() {
        return;
    }
    metrics::counter!(
        "profiler_profiles_total",
        "plugin" => plugin.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_internal_fault(kind: &'static str) {
    if !enabled() {
        return;
    }
    metrics::counter!("profiler_internal_faults_total", "kind" => kind).increment(1);
}
