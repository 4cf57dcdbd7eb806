//! Pipeline runner.
//!
//! # Responsibilities
//! - Dispatch a request through the plugins in order
//! - Supply each plugin with `next` (following stage) and `first` (restart)
//! - Hand the request to the transport once every plugin has delegated

use std::sync::Arc;

use crate::message::Request;
use crate::pipeline::plugin::{Next, Plugin, PluginFuture};

/// The terminal stage of a pipeline: performs the actual exchange.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> PluginFuture;
}

impl<F> Transport for F
where
    F: Fn(Request) -> PluginFuture + Send + Sync,
{
    fn send(&self, request: Request) -> PluginFuture {
        self(request)
    }
}

struct ChainInner {
    plugins: Vec<Arc<dyn Plugin>>,
    transport: Arc<dyn Transport>,
}

/// An ordered set of plugins in front of a transport.
#[derive(Clone)]
pub struct PluginChain {
    inner: Arc<ChainInner>,
}

impl PluginChain {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ChainInner { plugins, transport }),
        }
    }

    /// Send a request through the whole pipeline.
    pub fn send(&self, request: Request) -> PluginFuture {
        Self::dispatch(self.inner.clone(), 0, request)
    }

    /// Plugin identities, in pipeline order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.inner
            .plugins
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    fn dispatch(inner: Arc<ChainInner>, index: usize, request: Request) -> PluginFuture {
        let plugin = match inner.plugins.get(index) {
            Some(plugin) => plugin.clone(),
            None => return inner.transport.send(request),
        };

        let next_inner = inner.clone();
        let next: Next = Arc::new(move |req| Self::dispatch(next_inner.clone(), index + 1, req));
        let first: Next = Arc::new(move |req| Self::dispatch(inner.clone(), 0, req));

        plugin.handle_request(request, next, first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Response;
    use crate::pipeline::PluginError;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Appends its name to a shared log, then delegates.
    struct Tagging {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Plugin for Tagging {
        fn name(&self) -> &str {
            self.name
        }

        fn handle_request(&self, request: Request, next: Next, _first: Next) -> PluginFuture {
            self.log.lock().unwrap().push(self.name);
            next(request)
        }
    }

    fn ok_transport() -> Arc<dyn Transport> {
        Arc::new(|request: Request| -> PluginFuture {
            let body = Bytes::from(request.uri().path().to_string());
            Box::pin(async move { Ok::<Response, PluginError>(Response::new(body)) })
        })
    }

    #[tokio::test]
    async fn test_plugins_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Tagging { name: "a", log: log.clone() }),
            Arc::new(Tagging { name: "b", log: log.clone() }),
        ];
        let chain = PluginChain::new(plugins, ok_transport());

        let request = http::Request::builder()
            .uri("/ping")
            .body(Bytes::new())
            .unwrap();
        let response = chain.send(request).await.unwrap();

        assert_eq!(response.body(), &Bytes::from_static(b"/ping"));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(chain.plugin_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_chain_hits_transport() {
        let chain = PluginChain::new(Vec::new(), ok_transport());
        let request = http::Request::builder()
            .uri("/direct")
            .body(Bytes::new())
            .unwrap();
        let response = chain.send(request).await.unwrap();
        assert_eq!(response.body(), &Bytes::from_static(b"/direct"));
    }
}
