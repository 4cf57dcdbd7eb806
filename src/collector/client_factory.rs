//! Assembly of profiled client pipelines.
//!
//! # Responsibilities
//! - Wrap every configured plugin in a ProfilePlugin
//! - Put a StackPlugin in front of the pipeline for the named client
//! - Leave the pipeline untouched when profiling is disabled

use std::sync::Arc;

use crate::collector::collector::Collector;
use crate::collector::profile_plugin::ProfilePlugin;
use crate::collector::stack_plugin::StackPlugin;
use crate::config::ProfilingConfig;
use crate::message::{Formatter, FullHttpMessageFormatter};
use crate::pipeline::{Plugin, PluginChain, Transport};

/// Builds the plugin chain of one named client.
pub struct ProfiledClientBuilder {
    client: String,
    collector: Arc<Collector>,
    formatter: Arc<dyn Formatter>,
    plugins: Vec<Arc<dyn Plugin>>,
    profiling: bool,
}

impl ProfiledClientBuilder {
    pub fn new(
        client: impl Into<String>,
        collector: Arc<Collector>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            client: client.into(),
            collector,
            formatter,
            plugins: Vec::new(),
            profiling: true,
        }
    }

    /// Builder using a [`FullHttpMessageFormatter`] set up from `config`.
    pub fn from_config(
        client: impl Into<String>,
        collector: Arc<Collector>,
        config: &ProfilingConfig,
    ) -> Self {
        let formatter = FullHttpMessageFormatter::new(config.captured_body_length)
            .with_curl_commands(config.capture_curl_command);
        Self::new(client, collector, Arc::new(formatter)).profiling(config.enabled)
    }

    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    pub fn build(self, transport: Arc<dyn Transport>) -> PluginChain {
        if !self.profiling {
            return PluginChain::new(self.plugins, transport);
        }

        let mut plugins: Vec<Arc<dyn Plugin>> = Vec::with_capacity(self.plugins.len() + 1);
        plugins.push(Arc::new(StackPlugin::new(
            self.collector.clone(),
            self.formatter.clone(),
            self.client.clone(),
        )));
        for plugin in self.plugins {
            plugins.push(Arc::new(ProfilePlugin::new(
                plugin,
                self.collector.clone(),
                self.formatter.clone(),
            )));
        }

        tracing::debug!(client = %self.client, plugins = plugins.len() - 1, "Profiled client built");
        PluginChain::new(plugins, transport)
    }
}
