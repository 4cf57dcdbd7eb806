//! Built-in plugins.
//!
//! # Plugins
//! - `HeaderDefaultsPlugin`: sets headers the request does not carry yet
//! - `RetryPlugin`: re-sends idempotent requests after transfer errors
//! - `RedirectPlugin`: follows 3xx responses by restarting the pipeline
//!
//! # Design Decisions
//! - Retries call `next` again, so every attempt lands in the same trace
//! - Redirects call `first`, so the follow-up request is traced as a
//!   nested invocation
//! - Never retry POST/PATCH (non-idempotent)

use std::sync::Arc;

use http::header::{HeaderMap, LOCATION};
use http::{Method, StatusCode, Uri};

use crate::message::{clone_request, Request, Response};
use crate::pipeline::plugin::{Next, Plugin, PluginFuture};
use crate::pipeline::PluginError;

/// Adds default headers to every request.
#[derive(Debug, Clone, Default)]
pub struct HeaderDefaultsPlugin {
    headers: HeaderMap,
}

impl HeaderDefaultsPlugin {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }
}

impl Plugin for HeaderDefaultsPlugin {
    fn name(&self) -> &str {
        "header_defaults"
    }

    fn handle_request(&self, mut request: Request, next: Next, _first: Next) -> PluginFuture {
        for (name, value) in &self.headers {
            if !request.headers().contains_key(name) {
                request.headers_mut().insert(name.clone(), value.clone());
            }
        }
        next(request)
    }
}

/// Retries idempotent requests that failed with a transfer error.
#[derive(Debug, Clone)]
pub struct RetryPlugin {
    max_retries: u32,
}

impl RetryPlugin {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl Plugin for RetryPlugin {
    fn name(&self) -> &str {
        "retry"
    }

    fn handle_request(&self, request: Request, next: Next, _first: Next) -> PluginFuture {
        let max_retries = self.max_retries;
        let retryable = request.method().is_idempotent();
        let template = clone_request(&request);
        let first_attempt = next(request);

        Box::pin(async move {
            let mut result = first_attempt.await;
            let mut attempt = 0;
            while retryable
                && attempt < max_retries
                && matches!(result, Err(PluginError::Transfer(_)))
            {
                attempt += 1;
                tracing::info!(attempt, uri = %template.uri(), "Retrying after transfer error");
                result = next(clone_request(&template)).await;
            }
            result
        })
    }
}

/// Number of redirects already followed for a request.
#[derive(Debug, Clone, Copy, Default)]
struct RedirectCount(u32);

/// Follows redirect responses through the whole pipeline.
#[derive(Debug, Clone)]
pub struct RedirectPlugin {
    max_redirects: u32,
}

impl RedirectPlugin {
    pub fn new(max_redirects: u32) -> Self {
        Self { max_redirects }
    }
}

impl Default for RedirectPlugin {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Plugin for RedirectPlugin {
    fn name(&self) -> &str {
        "redirect"
    }

    fn handle_request(&self, request: Request, next: Next, first: Next) -> PluginFuture {
        let max_redirects = self.max_redirects;
        let followed = request
            .extensions()
            .get::<RedirectCount>()
            .copied()
            .unwrap_or_default()
            .0;
        let template = clone_request(&request);
        let pending = next(request);

        Box::pin(async move {
            let response = pending.await?;
            let location = match redirect_target(&template, &response) {
                Some(location) => location,
                None => return Ok(response),
            };
            if followed >= max_redirects {
                return Err(PluginError::Other(
                    format!("Too many redirects ({}) for {}", followed, template.uri()).into(),
                ));
            }

            let mut redirected = clone_request(&template);
            if response.status() == StatusCode::SEE_OTHER && template.method() != Method::HEAD {
                *redirected.method_mut() = Method::GET;
                *redirected.body_mut() = Default::default();
            }
            *redirected.uri_mut() = location;
            redirected.extensions_mut().insert(RedirectCount(followed + 1));

            tracing::debug!(from = %template.uri(), to = %redirected.uri(), "Following redirect");
            first(redirected).await
        })
    }
}

fn redirect_target(request: &Request, response: &Response) -> Option<Uri> {
    let status = response.status();
    let is_redirect = matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !is_redirect {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    resolve_location(request.uri(), location)
}

/// Resolve an absolute URI or an absolute path against the request URI.
fn resolve_location(base: &Uri, location: &str) -> Option<Uri> {
    if location.starts_with('/') {
        let mut parts = base.clone().into_parts();
        parts.path_and_query = Some(location.parse().ok()?);
        return Uri::from_parts(parts).ok();
    }
    let target: Uri = location.parse().ok()?;
    target.scheme().is_some().then_some(target)
}

/// Convenience: shared handles for the built-ins.
pub fn default_plugins(headers: HeaderMap, max_retries: u32) -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(HeaderDefaultsPlugin::new(headers)),
        Arc::new(RetryPlugin::new(max_retries)),
        Arc::new(RedirectPlugin::default()),
    ]
}
