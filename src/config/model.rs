// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Launcher configuration as read from a TOML file.
///
/// ```toml
/// default_pipeline_root = "minio://mlpipeline/v2/artifacts"
///
/// [namespace.team-a]
/// default_pipeline_root = "gs://team-a-bucket/pipelines"
/// ```
///
/// A namespace entry wins over the top-level default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub default_pipeline_root: Option<String>,

    #[serde(default)]
    pub namespace: BTreeMap<String, NamespaceConfig>,
}

/// `[namespace.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub default_pipeline_root: Option<String>,
}

impl LauncherConfig {
    /// Default pipeline root for `namespace`, ignoring empty values.
    pub fn pipeline_root_for(&self, namespace: &str) -> Option<&str> {
        self.namespace
            .get(namespace)
            .and_then(|ns| ns.default_pipeline_root.as_deref())
            .filter(|root| !root.is_empty())
            .or_else(|| {
                self.default_pipeline_root
                    .as_deref()
                    .filter(|root| !root.is_empty())
            })
    }
}
