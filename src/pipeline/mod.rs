//! Plugin pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! PluginChain::send(request)
//!     → plugin[0].handle_request(request, next, first)
//!         next  → plugin[1] ... → Transport::send
//!         first → plugin[0] (restart, e.g. after a redirect)
//!     ← PluginFuture resolves to Response or PluginError
//! ```
//!
//! # Design Decisions
//! - Plugins are trait objects composed by the chain, never by inheritance
//! - `next` / `first` are shared closures so a plugin may call them repeatedly
//! - Every future is `'static + Send`; plugins clone what they capture

pub mod builtin;
pub mod chain;
pub mod error;
pub mod plugin;

pub use chain::{PluginChain, Transport};
pub use error::PluginError;
pub use plugin::{next_fn, Next, Plugin, PluginFuture, PluginResult};
