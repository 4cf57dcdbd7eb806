//! Shared trace types and error definitions.

use std::any::Any;

use thiserror::Error;
use uuid::Uuid;

use crate::observability::metrics;

/// Settlement state of a Profile or Stack.
///
/// ```text
/// Pending → Fulfilled(response)
/// Pending → Rejected(failure)
/// ```
/// Both terminal states are final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Pending,
    Fulfilled(String),
    Rejected(String),
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Formatted response, once fulfilled.
    pub fn response(&self) -> Option<&str> {
        match self {
            Outcome::Fulfilled(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Formatted failure, once rejected.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Outcome::Rejected(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Fulfilled(_) => "fulfilled",
            Outcome::Rejected(_) => "rejected",
        }
    }

    /// Move out of `Pending`. A settled outcome is left untouched.
    pub(crate) fn settle(&mut self, next: Outcome, record: &'static str) -> Result<(), TraceError> {
        if !self.is_pending() {
            return Err(TraceError::AlreadySettled(record));
        }
        *self = next;
        Ok(())
    }
}

/// Internal consistency errors of the profiler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TraceError {
    /// A profiled plugin ran outside of any stack.
    #[error("No active stack to record plugin '{0}' into")]
    NoActiveStack(String),

    /// Pop on an empty active stack chain.
    #[error("Active stack chain is empty")]
    EmptyChain,

    /// The popped stack is not the one the caller opened.
    #[error("Stack {expected} popped out of order (top was {actual})")]
    UnbalancedPop { expected: Uuid, actual: Uuid },

    /// Second settlement of a record.
    #[error("{0} is already settled")]
    AlreadySettled(&'static str),
}

/// Log and count a bookkeeping fault raised inside a continuation.
///
/// The pipeline outcome is never replaced by such a fault.
pub(crate) fn report_fault(result: Result<(), TraceError>) {
    if let Err(error) = result {
        tracing::error!(error = %error, "Profiler bookkeeping fault");
        metrics::record_internal_fault(fault_kind(&error));
    }
}

fn fault_kind(error: &TraceError) -> &'static str {
    match error {
        TraceError::NoActiveStack(_) => "no_active_stack",
        TraceError::EmptyChain => "empty_chain",
        TraceError::UnbalancedPop { .. } => "unbalanced_pop",
        TraceError::AlreadySettled(_) => "already_settled",
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_settles_once() {
        let mut outcome = Outcome::default();
        assert!(outcome.is_pending());

        outcome
            .settle(Outcome::Fulfilled("ok".into()), "profile")
            .unwrap();
        assert_eq!(outcome.response(), Some("ok"));
        assert_eq!(outcome.failure(), None);

        let err = outcome
            .settle(Outcome::Rejected("late".into()), "profile")
            .unwrap_err();
        assert_eq!(err, TraceError::AlreadySettled("profile"));
        assert_eq!(outcome, Outcome::Fulfilled("ok".into()));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(&*payload), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }

    #[test]
    fn test_error_display() {
        let err = TraceError::NoActiveStack("retry".into());
        assert_eq!(err.to_string(), "No active stack to record plugin 'retry' into");
        assert_eq!(fault_kind(&err), "no_active_stack");
    }
}
