//! Request-scoped trace registry.
//!
//! # Responsibilities
//! - Track the chain of open Stacks (top = active stack)
//! - Keep every Stack pushed during the outer request, open or closed
//! - Answer queries of the reporting consumer
//!
//! # Design Decisions
//! - One Collector per outer request; it is dropped or handed off at the end
//! - LIFO chain instead of a single pointer, so nested invocations restore
//!   their caller's stack on pop
//! - Pops go through `ActiveStackGuard`, which also pops on drop

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::collector::report::TraceReport;
use crate::collector::stack::Stack;
use crate::collector::types::{report_fault, TraceError};

/// Registry of the Stacks recorded for one outer request.
#[derive(Debug, Default)]
pub struct Collector {
    state: Mutex<CollectorState>,
}

#[derive(Debug, Default)]
struct CollectorState {
    active: Vec<Arc<Stack>>,
    stacks: Vec<Arc<Stack>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open stack.
    pub fn active_stack(&self) -> Option<Arc<Stack>> {
        self.lock().active.last().cloned()
    }

    /// Number of open stacks.
    pub fn depth(&self) -> usize {
        self.lock().active.len()
    }

    /// Make `stack` the active stack.
    ///
    /// The previous active stack, if any, becomes its parent. The stack is
    /// recorded immediately so a live consumer sees it while it is open.
    pub fn push_stack(&self, stack: Arc<Stack>) {
        let mut state = self.lock();
        if let Some(parent) = state.active.last() {
            stack.set_parent(parent);
        }
        state.stacks.push(stack.clone());
        state.active.push(stack);
    }

    /// Remove and return the active stack.
    pub fn pop_stack(&self) -> Result<Arc<Stack>, TraceError> {
        self.lock().active.pop().ok_or(TraceError::EmptyChain)
    }

    /// Push `stack` and return a guard that pops it.
    pub fn activate(self: &Arc<Self>, stack: Arc<Stack>) -> ActiveStackGuard {
        self.push_stack(stack.clone());
        ActiveStackGuard {
            collector: self.clone(),
            stack,
            released: false,
        }
    }

    /// Every recorded stack, in push order.
    pub fn stacks(&self) -> Vec<Arc<Stack>> {
        self.lock().stacks.clone()
    }

    /// Stacks that were not opened from within another stack.
    pub fn root_stacks(&self) -> Vec<Arc<Stack>> {
        self.filtered(|stack| stack.parent_id().is_none())
    }

    /// Stacks opened directly from within `parent`.
    pub fn child_stacks(&self, parent: &Stack) -> Vec<Arc<Stack>> {
        let parent_id = parent.id();
        self.filtered(|stack| stack.parent_id() == Some(parent_id))
    }

    pub fn successful_stacks(&self) -> Vec<Arc<Stack>> {
        self.filtered(|stack| stack.outcome().response().is_some())
    }

    pub fn failed_stacks(&self) -> Vec<Arc<Stack>> {
        self.filtered(|stack| stack.is_failed())
    }

    /// Client names, in order of first appearance.
    pub fn clients(&self) -> Vec<String> {
        let mut clients: Vec<String> = Vec::new();
        for stack in self.stacks() {
            if !clients.iter().any(|c| c == stack.client()) {
                clients.push(stack.client().to_string());
            }
        }
        clients
    }

    pub fn client_root_stacks(&self, client: &str) -> Vec<Arc<Stack>> {
        self.filtered(|stack| stack.client() == client && stack.parent_id().is_none())
    }

    /// Messages sent by `client`: its root stacks plus everything nested below.
    pub fn count_client_messages(&self, client: &str) -> usize {
        self.client_root_stacks(client)
            .iter()
            .map(|stack| self.count_stack_messages(stack))
            .sum()
    }

    fn count_stack_messages(&self, stack: &Stack) -> usize {
        1 + self
            .child_stacks(stack)
            .iter()
            .map(|child| self.count_stack_messages(child))
            .sum::<usize>()
    }

    /// Sum of the durations of the closed root stacks.
    pub fn total_duration(&self) -> Duration {
        self.root_stacks()
            .iter()
            .filter_map(|stack| stack.duration())
            .sum()
    }

    /// Forget every recorded stack and open chain.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.active.clear();
        state.stacks.clear();
    }

    /// Snapshot of the trace tree for the reporting consumer.
    pub fn report(&self) -> TraceReport {
        TraceReport::from_collector(self)
    }

    fn filtered(&self, keep: impl Fn(&Stack) -> bool) -> Vec<Arc<Stack>> {
        self.stacks()
            .into_iter()
            .filter(|stack| keep(&**stack))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().expect("collector mutex poisoned")
    }
}

/// Scoped activation of a stack.
///
/// [`release`](Self::release) pops and checks that the popped stack is the
/// guarded one. Dropping an unreleased guard pops as well, which covers
/// unwinding and futures dropped before they settle.
#[must_use = "dropping the guard pops the stack"]
#[derive(Debug)]
pub struct ActiveStackGuard {
    collector: Arc<Collector>,
    stack: Arc<Stack>,
    released: bool,
}

impl ActiveStackGuard {
    pub fn stack(&self) -> &Arc<Stack> {
        &self.stack
    }

    /// Pop the guarded stack.
    pub fn release(mut self) -> Result<Arc<Stack>, TraceError> {
        self.released = true;
        self.pop()
    }

    fn pop(&self) -> Result<Arc<Stack>, TraceError> {
        let popped = self.collector.pop_stack()?;
        if Arc::ptr_eq(&popped, &self.stack) {
            Ok(popped)
        } else {
            Err(TraceError::UnbalancedPop {
                expected: self.stack.id(),
                actual: popped.id(),
            })
        }
    }
}

impl Drop for ActiveStackGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        tracing::debug!(stack_id = %self.stack.id(), "Popping stack of an unsettled invocation");
        report_fault(self.pop().map(|_| ()));
    }
}
