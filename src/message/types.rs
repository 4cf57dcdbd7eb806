//! Request and response types flowing through the plugin pipeline.
//!
//! # Design Decisions
//! - Bodies are fully buffered; the transport owns streaming
//! - `http::Request` is not `Clone` (extensions are type-erased), so plugins
//!   that re-send a request copy it through [`clone_request`]

use bytes::Bytes;

/// Outgoing request handled by plugins.
pub type Request = http::Request<Bytes>;

/// Response produced by the transport or a plugin.
pub type Response = http::Response<Bytes>;

/// Copy method, URI, version, headers and body of a request.
///
/// Extensions are not carried over.
pub fn clone_request(request: &Request) -> Request {
    let mut copy = http::Request::new(request.body().clone());
    *copy.method_mut() = request.method().clone();
    *copy.uri_mut() = request.uri().clone();
    *copy.version_mut() = request.version();
    *copy.headers_mut() = request.headers().clone();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_request_copies_parts() {
        let original = http::Request::builder()
            .method("POST")
            .uri("http://example.com/api?x=1")
            .header("X-Trace", "abc")
            .body(Bytes::from_static(b"payload"))
            .unwrap();

        let copy = clone_request(&original);
        assert_eq!(copy.method(), original.method());
        assert_eq!(copy.uri(), original.uri());
        assert_eq!(copy.headers()["x-trace"], "abc");
        assert_eq!(copy.body(), original.body());
    }
}
