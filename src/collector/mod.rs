//! Pipeline profiling subsystem.
//!
//! # Data Flow
//! ```text
//! client call
//!     → stack_plugin.rs (new Stack, pushed as active stack)
//!         → profile_plugin.rs (Profile appended to active stack)
//!             → wrapped plugin → next stage ...
//!         ← Profile settled (response or failure text)
//!     ← Stack settled, popped; previous active stack restored
//!
//! collector.rs keeps every Stack → report.rs snapshot → reporting consumer
//! ```
//!
//! # Design Decisions
//! - One Collector per outer request, shared through `Arc`
//! - Active stacks form a LIFO chain so nested calls restore their caller
//! - Decorators never change the pipeline outcome, including panics
//! - Records settle once; bookkeeping faults are logged and counted

#[allow(clippy::module_inception)]
pub mod collector;
pub mod client_factory;
pub mod profile;
pub mod profile_plugin;
pub mod report;
pub mod stack;
pub mod stack_plugin;
pub mod types;

pub use client_factory::ProfiledClientBuilder;
pub use collector::{ActiveStackGuard, Collector};
pub use profile::Profile;
pub use profile_plugin::ProfilePlugin;
pub use report::{ProfileReport, StackReport, TraceReport};
pub use stack::Stack;
pub use stack_plugin::StackPlugin;
pub use types::{panic_message, Outcome, TraceError};
