// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::InvocationContext;

use super::model::LauncherConfig;
use super::{ClusterConfig, ConfigError, ConfigFuture};

/// Load a launcher configuration file.
///
/// This only performs TOML deserialization; whether a namespace actually has a
/// default is decided at lookup time.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<LauncherConfig, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: LauncherConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// [`ClusterConfig`] backed by a launcher TOML file.
///
/// The file is read on every lookup, the same way a cluster config map would be
/// fetched, so a missing or unreadable file only matters to invocations that
/// actually need a default.
#[derive(Debug, Clone)]
pub struct FileClusterConfig {
    path: PathBuf,
}

impl FileClusterConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClusterConfig for FileClusterConfig {
    fn default_pipeline_root<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        namespace: &'a str,
    ) -> ConfigFuture<'a, String> {
        Box::pin(async move {
            ctx.check("read launcher config")?;
            debug!(path = ?self.path, namespace, "reading launcher config");
            let contents = tokio::fs::read_to_string(&self.path).await?;
            let config: LauncherConfig = toml::from_str(&contents)?;
            config
                .pipeline_root_for(namespace)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingDefault(namespace.to_string()))
        })
    }
}
