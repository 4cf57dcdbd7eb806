//! HTTP message handling subsystem.
//!
//! # Data Flow
//! ```text
//! Plugin pipeline
//!     → types.rs (Request / Response aliases, copying helpers)
//!     → formatter.rs (render request, response, failure as display text)
//!     → collector (stores the rendered text in Stack / Profile records)
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered `Bytes`, so formatting never consumes a stream
//! - Formatting is pure: inputs are borrowed, never mutated
//! - Body capture is bounded by `captured_body_length`

pub mod formatter;
pub mod types;

pub use formatter::{Formatter, FullHttpMessageFormatter};
pub use types::{clone_request, Request, Response};
