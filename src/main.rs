//! Plugin pipeline profiler demo.
//!
//! Sends one request through a profiled pipeline backed by an in-memory
//! transport and prints the collected trace as JSON.
//!
//! ```text
//! request → stack → header_defaults → retry → redirect → in-memory transport
//!                                                 │
//!                                                 └─ 3xx: first(request) → nested stack
//! ```
//!
//! The in-memory transport answers `/old` with a redirect to `/new`, and
//! fails the first `--fail` attempts with a transfer error.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use http::header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT};

use plugin_profiler::config::{load_config, ProfilerConfig};
use plugin_profiler::message::Request;
use plugin_profiler::observability::{logging::init_logging, metrics::init_metrics};
use plugin_profiler::pipeline::builtin::default_plugins;
use plugin_profiler::pipeline::{PluginError, PluginFuture, Transport};
use plugin_profiler::{Collector, ProfiledClientBuilder};

#[derive(Parser)]
#[command(name = "plugin-profiler")]
#[command(about = "Trace a request through a profiled plugin pipeline", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Client name recorded on the trace
    #[arg(long, default_value = "demo")]
    client: String,

    #[arg(short, long, default_value = "GET")]
    method: String,

    #[arg(short, long, default_value = "http://example.com/old")]
    uri: String,

    /// Number of initial attempts the transport fails
    #[arg(long, default_value_t = 0)]
    fail: u32,

    /// Retries after a transfer error
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

fn in_memory_transport(failures: u32) -> Arc<dyn Transport> {
    let attempts = Arc::new(AtomicU32::new(0));
    Arc::new(move |request: Request| -> PluginFuture {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        let path = request.uri().path().to_string();
        Box::pin(async move {
            if attempt < failures {
                return Err(PluginError::Transfer(format!(
                    "connection refused (attempt {})",
                    attempt + 1
                )));
            }
            let response = if path == "/old" {
                http::Response::builder()
                    .status(302)
                    .header(LOCATION, "/new")
                    .body(Bytes::new())
            } else {
                http::Response::builder()
                    .status(200)
                    .header("content-type", "application/json")
                    .body(Bytes::from(format!("{{\"path\":\"{}\"}}", path)))
            };
            response.map_err(|e| PluginError::Other(Box::new(e)))
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProfilerConfig::default(),
    };
    init_logging(&config.observability);
    init_metrics(&config.observability);

    tracing::info!(
        client = %cli.client,
        profiling = config.profiling.enabled,
        captured_body_length = config.profiling.captured_body_length,
        "Configuration loaded"
    );

    let collector = Arc::new(Collector::new());
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("plugin-profiler/0.1"));

    let chain = ProfiledClientBuilder::from_config(cli.client.clone(), collector.clone(), &config.profiling)
        .plugins(default_plugins(headers, cli.retries))
        .build(in_memory_transport(cli.fail));

    let request: Request = http::Request::builder()
        .method(cli.method.as_str())
        .uri(cli.uri.as_str())
        .body(Bytes::new())?;

    match chain.send(request).await {
        Ok(response) => tracing::info!(status = %response.status(), "Request completed"),
        Err(e) => tracing::warn!(error = %e, "Request failed"),
    }

    println!("{}", collector.report().to_json_pretty()?);
    Ok(())
}
