use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pipeline_driver::config::{ClusterConfig, ConfigError, ConfigFuture};
use pipeline_driver::context::InvocationContext;

/// Cluster config with a fixed answer that counts how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterConfig {
    root: Option<String>,
    lookups: Arc<AtomicUsize>,
}

impl StaticClusterConfig {
    pub fn with_root(root: &str) -> Self {
        Self {
            root: Some(root.to_string()),
            lookups: Arc::default(),
        }
    }

    /// A cluster without any configured default.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ClusterConfig for StaticClusterConfig {
    fn default_pipeline_root<'a>(
        &'a self,
        _ctx: &'a InvocationContext,
        namespace: &'a str,
    ) -> ConfigFuture<'a, String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let root = self.root.clone();
        Box::pin(async move { root.ok_or_else(|| ConfigError::MissingDefault(namespace.to_string())) })
    }
}
