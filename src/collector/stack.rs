//! Trace of one full pipeline invocation for a named client.
//!
//! # Responsibilities
//! - Hold the summary request / response / failure of the invocation
//! - Hold the Profiles of the wrapped plugins, in invocation order
//! - Link to the enclosing Stack for nested invocations
//!
//! # Design Decisions
//! - The parent link is weak; the Collector owns every Stack
//! - Failure text is kept apart from the response text
//! - Settlement happens once; a second attempt is reported, not applied

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::collector::profile::Profile;
use crate::collector::types::{Outcome, TraceError};
use crate::message::Request;

/// Trace of one pipeline invocation.
#[derive(Debug)]
pub struct Stack {
    id: Uuid,
    client: String,
    request: String,
    method: String,
    target: String,
    host: Option<String>,
    scheme: Option<String>,
    curl_command: Option<String>,
    started_at: Instant,
    state: Mutex<StackState>,
}

#[derive(Debug, Default)]
struct StackState {
    parent: Option<Weak<Stack>>,
    parent_id: Option<Uuid>,
    profiles: Vec<Arc<Profile>>,
    outcome: Outcome,
    response_status: Option<u16>,
    duration: Option<Duration>,
}

impl Stack {
    /// Create an open stack for `client` with its formatted request.
    pub fn new(client: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client: client.into(),
            request: request.into(),
            method: String::new(),
            target: String::new(),
            host: None,
            scheme: None,
            curl_command: None,
            started_at: Instant::now(),
            state: Mutex::new(StackState::default()),
        }
    }

    /// Capture method, target, host and scheme of the request.
    pub fn describing(mut self, request: &Request) -> Self {
        let uri = request.uri();
        self.method = request.method().to_string();
        self.target = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        self.host = uri.host().map(str::to_string);
        self.scheme = uri.scheme_str().map(str::to_string);
        self
    }

    pub fn with_curl_command(mut self, curl_command: Option<String>) -> Self {
        self.curl_command = curl_command;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn curl_command(&self) -> Option<&str> {
        self.curl_command.as_deref()
    }

    /// Enclosing stack, while the Collector still holds it.
    pub fn parent(&self) -> Option<Arc<Stack>> {
        self.lock().parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.lock().parent_id
    }

    pub(crate) fn set_parent(&self, parent: &Arc<Stack>) {
        let mut state = self.lock();
        state.parent = Some(Arc::downgrade(parent));
        state.parent_id = Some(parent.id);
    }

    /// Append a profile. Order of calls is invocation order.
    pub fn add_profile(&self, profile: Arc<Profile>) {
        self.lock().profiles.push(profile);
    }

    pub fn profiles(&self) -> Vec<Arc<Profile>> {
        self.lock().profiles.clone()
    }

    pub fn outcome(&self) -> Outcome {
        self.lock().outcome.clone()
    }

    pub fn response(&self) -> Option<String> {
        self.lock().outcome.response().map(str::to_string)
    }

    pub fn failure(&self) -> Option<String> {
        self.lock().outcome.failure().map(str::to_string)
    }

    pub fn is_failed(&self) -> bool {
        self.lock().outcome.is_rejected()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().outcome.is_pending()
    }

    pub fn response_status(&self) -> Option<u16> {
        self.lock().response_status
    }

    /// Record the HTTP status seen by the pipeline. Ignored once closed.
    pub(crate) fn set_response_status(&self, status: u16) {
        let mut state = self.lock();
        if state.outcome.is_pending() {
            state.response_status = Some(status);
        }
    }

    /// Time between creation and settlement.
    pub fn duration(&self) -> Option<Duration> {
        self.lock().duration
    }

    /// Close the stack with the formatted response.
    pub fn complete(&self, response: impl Into<String>) -> Result<(), TraceError> {
        self.settle(Outcome::Fulfilled(response.into()))
    }

    /// Close the stack with the formatted failure.
    pub fn fail(&self, failure: impl Into<String>) -> Result<(), TraceError> {
        self.settle(Outcome::Rejected(failure.into()))
    }

    fn settle(&self, outcome: Outcome) -> Result<(), TraceError> {
        let mut state = self.lock();
        state.outcome.settle(outcome, "stack")?;
        state.duration = Some(self.started_at.elapsed());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StackState> {
        self.state.lock().expect("stack mutex poisoned")
    }
}
