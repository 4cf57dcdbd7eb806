//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Decorators and collector produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log output configured by the embedding application
//!     → Whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (client, stack_id, plugin) on every event
//! - Metrics go through the `metrics` facade; no exporter is bundled
//! - Bookkeeping faults are logged at error level and counted

pub mod logging;
pub mod metrics;
