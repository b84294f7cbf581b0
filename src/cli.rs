// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;

use crate::driver::{DriverMode, Options};

/// Command-line arguments for `pipeline-driver`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipeline-driver",
    version,
    about = "Resolve a pipeline DAG node's inputs and record its execution.",
    long_about = None
)]
pub struct CliArgs {
    /// Which driver to run.
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    pub driver_type: DriverType,

    /// Pipeline context name.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub pipeline_name: String,

    /// Run ID.
    #[arg(long, value_name = "ID", default_value = "")]
    pub run_id: String,

    /// Component spec (JSON).
    #[arg(long, value_name = "JSON", default_value = "")]
    pub component: String,

    /// Runtime config (JSON). Root DAG only.
    #[arg(long, value_name = "JSON", default_value = "")]
    pub runtime_config: String,

    /// Task spec (JSON). Container only.
    #[arg(long, value_name = "JSON", default_value = "")]
    pub task: String,

    /// Parent DAG execution ID. Container only.
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub dag_execution_id: i64,

    /// Parent DAG context ID. Container only.
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub dag_context_id: i64,

    /// Kubernetes-style namespace of the run. Root DAG only.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub namespace: String,

    /// JSON snapshot backing the in-process metadata store.
    ///
    /// Loaded before the driver runs (if it exists) and written back after a
    /// successful invocation.
    #[arg(long, value_name = "PATH", default_value = "metadata.json")]
    pub metadata_state: PathBuf,

    /// Launcher config (TOML) holding default pipeline roots per namespace.
    #[arg(long, value_name = "PATH", default_value = "launcher.toml")]
    pub cluster_config: PathBuf,

    /// Write the created execution ID here.
    #[arg(long, value_name = "PATH")]
    pub execution_id_path: Option<PathBuf>,

    /// Write the root DAG's context ID here.
    #[arg(long, value_name = "PATH")]
    pub context_id_path: Option<PathBuf>,

    /// Write the task's executor input (JSON) here.
    #[arg(long, value_name = "PATH")]
    pub executor_input_path: Option<PathBuf>,

    /// Abort the invocation after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPELINE_DRIVER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the arguments and print them, without touching any store.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum DriverType {
    RootDag,
    Container,
}

impl From<DriverType> for DriverMode {
    fn from(t: DriverType) -> Self {
        match t {
            DriverType::RootDag => DriverMode::RootDag,
            DriverType::Container => DriverMode::Container,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Decode the JSON arguments into driver options.
    ///
    /// Empty or blank strings mean "not supplied".
    pub fn options(&self) -> Result<Options> {
        Ok(Options {
            pipeline_name: self.pipeline_name.clone(),
            run_id: self.run_id.clone(),
            component: parse_json_arg("--component", &self.component)?,
            runtime_config: parse_json_arg("--runtime-config", &self.runtime_config)?,
            task: parse_json_arg("--task", &self.task)?,
            dag_execution_id: self.dag_execution_id,
            dag_context_id: self.dag_context_id,
            namespace: self.namespace.clone(),
        })
    }
}

fn parse_json_arg<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<Option<T>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(raw).with_context(|| format!("parsing {flag} as JSON"))?;
    Ok(Some(value))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
