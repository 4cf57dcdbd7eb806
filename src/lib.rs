//! HTTP client plugin pipeline profiler.
//!
//! Records, for every outgoing request, which plugins ran, what they sent,
//! what they received and whether they failed. Invocations nest: a request
//! issued while another one is in flight (redirects, sub-requests) is
//! recorded as a child Stack of the one that triggered it.

pub mod collector;
pub mod config;
pub mod message;
pub mod observability;
pub mod pipeline;

pub use collector::{Collector, ProfilePlugin, ProfiledClientBuilder, Stack, StackPlugin, TraceReport};
pub use config::ProfilerConfig;
pub use message::{Formatter, FullHttpMessageFormatter};
pub use pipeline::{Plugin, PluginChain, PluginError};
