//! Shared fixtures for the profiler integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use plugin_profiler::message::{Formatter, Request, Response};
use plugin_profiler::pipeline::{next_fn, Next, Plugin, PluginError, PluginFuture, Transport};

/// Formatter returning fixed strings, like a stubbed message formatter.
pub struct FixedFormatter;

impl Formatter for FixedFormatter {
    fn format_request(&self, _request: &Request) -> String {
        "FormattedRequest".to_string()
    }

    fn format_response(&self, _response: &Response) -> String {
        "FormattedResponse".to_string()
    }

    fn format_failure(&self, _error: &PluginError) -> String {
        "FormattedException".to_string()
    }
}

/// Plugin that records what it receives and delegates to `next`.
pub struct MockPlugin {
    name: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MockPlugin {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URIs of the requests received, in order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_request(&self, request: Request, next: Next, _first: Next) -> PluginFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.uri().to_string());
        next(request)
    }
}

/// Plugin dividing by zero while handling the request.
pub struct DividingPlugin;

impl Plugin for DividingPlugin {
    fn name(&self) -> &str {
        "http.plugin.dividing"
    }

    fn handle_request(&self, _request: Request, _next: Next, _first: Next) -> PluginFuture {
        let quotient = divide(2, std::hint::black_box(0));
        Box::pin(async move { Ok(Response::new(Bytes::from(quotient.to_string()))) })
    }
}

pub fn divide(a: i32, b: i32) -> i32 {
    a / b
}

/// Error type used to check that failures come back untouched.
#[derive(Debug, PartialEq, Eq)]
pub struct CustomError {
    pub code: u32,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "custom error {}", self.code)
    }
}

impl std::error::Error for CustomError {}

pub fn request() -> Request {
    http::Request::builder()
        .method("GET")
        .uri("/")
        .header("x-request-marker", "original")
        .body(Bytes::new())
        .unwrap()
}

pub fn response() -> Response {
    http::Response::builder()
        .status(200)
        .header("x-mock", "1")
        .body(Bytes::from_static(b"mock body"))
        .unwrap()
}

/// `next` resolving with [`response`].
pub fn fulfilled_next() -> Next {
    next_fn(|_request| Box::pin(async { Ok(response()) }))
}

/// `next` rejecting with a transfer error.
pub fn rejected_next(message: &'static str) -> Next {
    next_fn(move |_request| Box::pin(async move { Err(PluginError::Transfer(message.into())) }))
}

/// `first` for tests that never restart the pipeline.
pub fn unused_first() -> Next {
    next_fn(|_request| -> PluginFuture { panic!("first must not be called") })
}

pub fn ok_transport() -> Arc<dyn Transport> {
    Arc::new(|_request: Request| -> PluginFuture { Box::pin(async { Ok(response()) }) })
}
