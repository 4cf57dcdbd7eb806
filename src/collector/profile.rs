//! Record of a single plugin invocation.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::collector::types::{Outcome, TraceError};

/// Trace of one plugin invocation: who ran, what it sent, what came back.
#[derive(Debug)]
pub struct Profile {
    plugin: String,
    request: String,
    started_at: Instant,
    state: Mutex<ProfileState>,
}

#[derive(Debug, Default)]
struct ProfileState {
    outcome: Outcome,
    duration: Option<Duration>,
}

impl Profile {
    /// Create a pending profile for `plugin` with its formatted request.
    pub fn new(plugin: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            request: request.into(),
            started_at: Instant::now(),
            state: Mutex::new(ProfileState::default()),
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn request(&self) -> &str {
        &self.request
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

    /// Time between creation and settlement.
    pub fn duration(&self) -> Option<Duration> {
        self.lock().duration
    }

    /// Record the formatted response. Fails if already settled.
    pub fn fulfill(&self, response: impl Into<String>) -> Result<(), TraceError> {
        self.settle(Outcome::Fulfilled(response.into()))
    }

    /// Record the formatted failure. Fails if already settled.
    pub fn reject(&self, failure: impl Into<String>) -> Result<(), TraceError> {
        self.settle(Outcome::Rejected(failure.into()))
    }

    fn settle(&self, outcome: Outcome) -> Result<(), TraceError> {
        let mut state = self.lock();
        state.outcome.settle(outcome, "profile")?;
        state.duration = Some(self.started_at.elapsed());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ProfileState> {
        self.state.lock().expect("profile mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_starts_pending() {
        let profile = Profile::new("retry", "GET / HTTP/1.1");
        assert_eq!(profile.plugin(), "retry");
        assert_eq!(profile.request(), "GET / HTTP/1.1");
        assert!(profile.is_pending());
        assert!(profile.response().is_none());
        assert!(profile.failure().is_none());
        assert!(profile.duration().is_none());
    }

    #[test]
    fn test_fulfill() {
        let profile = Profile::new("retry", "req");
        profile.fulfill("resp").unwrap();
        assert_eq!(profile.response().as_deref(), Some("resp"));
        assert!(!profile.is_failed());
        assert!(profile.duration().is_some());
    }

    #[test]
    fn test_reject() {
        let profile = Profile::new("retry", "req");
        profile.reject("Transfer error: reset").unwrap();
        assert!(profile.is_failed());
        assert_eq!(profile.failure().as_deref(), Some("Transfer error: reset"));
        assert!(profile.response().is_none());
    }

    #[test]
    fn test_second_settlement_is_rejected() {
        let profile = Profile::new("retry", "req");
        profile.reject("first").unwrap();

        assert_eq!(
            profile.fulfill("second"),
            Err(TraceError::AlreadySettled("profile"))
        );
        assert_eq!(profile.reject("third"), Err(TraceError::AlreadySettled("profile")));
        assert_eq!(profile.outcome(), Outcome::Rejected("first".into()));
    }
}
