// src/config/mod.rs

//! Cluster configuration collaborator.
//!
//! The only thing the driver needs from the cluster is a namespace-scoped
//! default pipeline root, used when a run does not name one explicitly.
//!
//! - `model.rs`: TOML-backed data model.
//! - `loader.rs`: reading the file and the file-backed [`ClusterConfig`].

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::context::{Interrupted, InvocationContext};

pub mod loader;
pub mod model;

pub use loader::{load_from_path, FileClusterConfig};
pub use model::{LauncherConfig, NamespaceConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("no default pipeline root configured for namespace {0:?}")]
    MissingDefault(String),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

pub type ConfigFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ConfigError>> + Send + 'a>>;

/// Source of cluster-level defaults.
pub trait ClusterConfig: Send + Sync {
    fn default_pipeline_root<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        namespace: &'a str,
    ) -> ConfigFuture<'a, String>;
}
