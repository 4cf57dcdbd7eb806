//! Read-only snapshot of the trace tree.
//!
//! The reporting consumer (debug panel, log sink) works on this snapshot
//! instead of the live records.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::collector::collector::Collector;
use crate::collector::profile::Profile;
use crate::collector::stack::Stack;

/// Every root stack of an outer request, children nested inside.
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    pub stacks: Vec<StackReport>,
    pub total_duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackReport {
    pub id: Uuid,
    pub client: String,
    pub request: String,
    pub method: String,
    pub target: String,
    pub host: Option<String>,
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curl_command: Option<String>,
    pub response: Option<String>,
    pub failure: Option<String>,
    pub failed: bool,
    pub pending: bool,
    pub status: Option<u16>,
    pub duration_ms: Option<f64>,
    pub profiles: Vec<ProfileReport>,
    pub children: Vec<StackReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub plugin: String,
    pub request: String,
    pub response: Option<String>,
    pub failure: Option<String>,
    pub failed: bool,
    pub duration_ms: Option<f64>,
}

impl TraceReport {
    pub fn from_collector(collector: &Collector) -> Self {
        let all = collector.stacks();
        let stacks = all
            .iter()
            .filter(|stack| stack.parent_id().is_none())
            .map(|stack| StackReport::build(stack, &all))
            .collect();
        Self {
            stacks,
            total_duration_ms: millis(collector.total_duration()),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl StackReport {
    fn build(stack: &Stack, all: &[Arc<Stack>]) -> Self {
        let outcome = stack.outcome();
        let children = all
            .iter()
            .filter(|candidate| candidate.parent_id() == Some(stack.id()))
            .map(|child| StackReport::build(child, all))
            .collect();

        Self {
            id: stack.id(),
            client: stack.client().to_string(),
            request: stack.request().to_string(),
            method: stack.method().to_string(),
            target: stack.target().to_string(),
            host: stack.host().map(str::to_string),
            scheme: stack.scheme().map(str::to_string),
            curl_command: stack.curl_command().map(str::to_string),
            response: outcome.response().map(str::to_string),
            failure: outcome.failure().map(str::to_string),
            failed: outcome.is_rejected(),
            pending: outcome.is_pending(),
            status: stack.response_status(),
            duration_ms: stack.duration().map(millis),
            profiles: stack.profiles().iter().map(|p| ProfileReport::from(&**p)).collect(),
            children,
        }
    }
}

impl From<&Profile> for ProfileReport {
    fn from(profile: &Profile) -> Self {
        let outcome = profile.outcome();
        Self {
            plugin: profile.plugin().to_string(),
            request: profile.request().to_string(),
            response: outcome.response().map(str::to_string),
            failure: outcome.failure().map(str::to_string),
            failed: outcome.is_rejected(),
            duration_ms: profile.duration().map(millis),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
