//! Rendering of HTTP messages and failures as display text.
//!
//! # Responsibilities
//! - Render requests and responses (start line, headers, bounded body)
//! - Render pipeline failures and panic payloads
//! - Render a request as a replayable curl command
//!
//! # Design Decisions
//! - Formatters are pure and deterministic: same input, same text
//! - A formatter never fails; a panicking formatter is a bug and unwinds
//!   through the decorators like any other fault

use http::HeaderMap;

use crate::message::types::{Request, Response};
use crate::pipeline::PluginError;

/// Renders messages for the trace.
pub trait Formatter: Send + Sync {
    fn format_request(&self, request: &Request) -> String;

    fn format_response(&self, response: &Response) -> String;

    /// Render a pipeline failure.
    ///
    /// An HTTP error carrying a response is rendered as that response.
    fn format_failure(&self, error: &PluginError) -> String {
        match error {
            PluginError::Http { response, .. } => self.format_response(response),
            PluginError::Transfer(message) => format!("Transfer error: {}", message),
            other => format!(
                "Unexpected error of type \"{}\": {}",
                other.kind(),
                other
            ),
        }
    }

    /// Render the payload of a panic raised inside the pipeline.
    fn format_fault(&self, message: &str) -> String {
        format!("Unexpected fault: {}", message)
    }

    fn format_as_curl_command(&self, _request: &Request) -> Option<String> {
        None
    }
}

/// Formatter rendering the full message, body included up to a limit.
#[derive(Debug, Clone, Default)]
pub struct FullHttpMessageFormatter {
    /// Maximum number of body characters rendered. `0` skips the body.
    max_body_length: usize,
    curl_commands: bool,
}

impl FullHttpMessageFormatter {
    pub fn new(max_body_length: usize) -> Self {
        Self {
            max_body_length,
            curl_commands: false,
        }
    }

    /// Also render requests as curl commands.
    pub fn with_curl_commands(mut self, enabled: bool) -> Self {
        self.curl_commands = enabled;
        self
    }

    fn format_body(&self, body: &[u8], out: &mut String) {
        if self.max_body_length == 0 || body.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(body);
        let mut chars = text.chars();
        out.extend(chars.by_ref().take(self.max_body_length));
        if chars.next().is_some() {
            out.push_str("...");
        }
    }
}

impl Formatter for FullHttpMessageFormatter {
    fn format_request(&self, request: &Request) -> String {
        let target = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut out = format!("{} {} {:?}\r\n", request.method(), target, request.version());
        format_headers(request.headers(), &mut out);
        out.push_str("\r\n");
        self.format_body(request.body(), &mut out);
        out
    }

    fn format_response(&self, response: &Response) -> String {
        let status = response.status();
        let mut out = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        format_headers(response.headers(), &mut out);
        out.push_str("\r\n");
        self.format_body(response.body(), &mut out);
        out
    }

    fn format_as_curl_command(&self, request: &Request) -> Option<String> {
        self.curl_commands.then(|| curl_command(request))
    }
}

fn format_headers(headers: &HeaderMap, out: &mut String) {
    for (name, value) in headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push_str("\r\n");
    }
}

/// Render a request as a curl command line.
pub fn curl_command(request: &Request) -> String {
    let mut command = String::from("curl");
    if request.method() != http::Method::GET {
        command.push_str(" --request ");
        command.push_str(request.method().as_str());
    }
    command.push(' ');
    command.push_str(&shell_quote(&request.uri().to_string()));
    for (name, value) in request.headers() {
        let header = format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        command.push_str(" -H ");
        command.push_str(&shell_quote(&header));
    }
    if !request.body().is_empty() {
        command.push_str(" --data ");
        command.push_str(&shell_quote(&String::from_utf8_lossy(request.body())));
    }
    command
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn request() -> Request {
        http::Request::builder()
            .method("POST")
            .uri("http://example.com/users?page=2")
            .header("Content-Type", "application/json")
            .body(Bytes::from_static(b"{\"name\":\"o'brien\"}"))
            .unwrap()
    }

    #[test]
    fn test_format_request_without_body() {
        let formatter = FullHttpMessageFormatter::new(0);
        let text = formatter.format_request(&request());
        assert_eq!(
            text,
            "POST /users?page=2 HTTP/1.1\r\ncontent-type: application/json\r\n\r\n"
        );
    }

    #[test]
    fn test_format_body_is_truncated() {
        let formatter = FullHttpMessageFormatter::new(5);
        let text = formatter.format_request(&request());
        assert!(text.ends_with("\r\n\r\n{\"nam..."));

        let formatter = FullHttpMessageFormatter::new(1000);
        let text = formatter.format_request(&request());
        assert!(text.ends_with("{\"name\":\"o'brien\"}"));
    }

    #[test]
    fn test_format_response() {
        let response = http::Response::builder()
            .status(404)
            .header("Server", "mock")
            .body(Bytes::new())
            .unwrap();
        let text = FullHttpMessageFormatter::new(100).format_response(&response);
        assert_eq!(text, "HTTP/1.1 404 Not Found\r\nserver: mock\r\n\r\n");
    }

    #[test]
    fn test_format_failure() {
        let formatter = FullHttpMessageFormatter::new(0);

        let transfer = PluginError::Transfer("connection refused".into());
        assert_eq!(
            formatter.format_failure(&transfer),
            "Transfer error: connection refused"
        );

        let response = http::Response::builder()
            .status(500)
            .body(Bytes::new())
            .unwrap();
        let http_error = PluginError::Http {
            message: "server error".into(),
            response: Box::new(response),
        };
        assert_eq!(
            formatter.format_failure(&http_error),
            "HTTP/1.1 500 Internal Server Error\r\n\r\n"
        );

        let other = PluginError::Other("boom".into());
        assert_eq!(
            formatter.format_failure(&other),
            "Unexpected error of type \"other\": boom"
        );
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let formatter = FullHttpMessageFormatter::new(64);
        let req = request();
        let first = formatter.format_request(&req);
        let second = formatter.format_request(&req);
        assert_eq!(first, second);
        assert_eq!(req.body(), &Bytes::from_static(b"{\"name\":\"o'brien\"}"));
    }

    #[test]
    fn test_curl_command() {
        let formatter = FullHttpMessageFormatter::new(0);
        assert!(formatter.format_as_curl_command(&request()).is_none());

        let formatter = formatter.with_curl_commands(true);
        let command = formatter.format_as_curl_command(&request()).unwrap();
        assert_eq!(
            command,
            "curl --request POST 'http://example.com/users?page=2' \
             -H 'content-type: application/json' \
             --data '{\"name\":\"o'\\''brien\"}'"
        );

        let get = http::Request::builder()
            .uri("http://example.com/")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(curl_command(&get), "curl 'http://example.com/'");
    }
}
