// src/driver/validate.rs

//! Mode-specific invocation checks.
//!
//! Validation runs before any collaborator is touched and reports the first
//! violated rule. On success the typed views hand the driver the fields the
//! mode guarantees, so it never has to re-check them.

use crate::errors::{DriverError, Result};
use crate::spec::{ComponentSpec, RuntimeConfig, TaskSpec};

use super::{DriverMode, Options};

/// Fields guaranteed present for a root DAG invocation.
#[derive(Debug, Clone, Copy)]
pub struct RootDagArgs<'a> {
    pub component: &'a ComponentSpec,
    pub runtime_config: &'a RuntimeConfig,
}

/// Fields guaranteed present for a task invocation.
#[derive(Debug, Clone, Copy)]
pub struct ContainerArgs<'a> {
    pub component: &'a ComponentSpec,
    pub task: &'a TaskSpec,
}

impl ContainerArgs<'_> {
    pub fn task_name(&self) -> &str {
        self.task.name()
    }
}

/// Check `opts` against the requirements of `mode`.
pub fn validate(opts: &Options, mode: DriverMode) -> Result<()> {
    match mode {
        DriverMode::RootDag => validate_root_dag(opts).map(|_| ()),
        DriverMode::Container => validate_container(opts).map(|_| ()),
    }
}

fn invalid(mode: DriverMode, reason: &str) -> DriverError {
    DriverError::InvalidArgs {
        mode,
        reason: reason.to_string(),
    }
}

pub fn validate_root_dag(opts: &Options) -> Result<RootDagArgs<'_>> {
    let mode = DriverMode::RootDag;
    if opts.pipeline_name.is_empty() {
        return Err(invalid(mode, "pipeline name is required"));
    }
    if opts.run_id.is_empty() {
        return Err(invalid(mode, "run ID is required"));
    }
    let Some(component) = opts.component.as_ref() else {
        return Err(invalid(mode, "component spec is required"));
    };
    let Some(runtime_config) = opts.runtime_config.as_ref() else {
        return Err(invalid(mode, "runtime config is required"));
    };
    if opts.namespace.is_empty() {
        return Err(invalid(mode, "namespace is required"));
    }
    if opts.task.is_some() {
        return Err(invalid(mode, "task spec is unnecessary"));
    }
    if opts.dag_execution_id != 0 {
        return Err(invalid(mode, "DAG execution ID is unnecessary"));
    }
    if opts.dag_context_id != 0 {
        return Err(invalid(mode, "DAG context ID is unnecessary"));
    }
    Ok(RootDagArgs {
        component,
        runtime_config,
    })
}

pub fn validate_container(opts: &Options) -> Result<ContainerArgs<'_>> {
    let mode = DriverMode::Container;
    if opts.pipeline_name.is_empty() {
        return Err(invalid(mode, "pipeline name is required"));
    }
    if opts.run_id.is_empty() {
        return Err(invalid(mode, "run ID is required"));
    }
    let Some(component) = opts.component.as_ref() else {
        return Err(invalid(mode, "component spec is required"));
    };
    let Some(task) = opts.task.as_ref().filter(|t| !t.name().is_empty()) else {
        return Err(invalid(mode, "task spec is required"));
    };
    if opts.runtime_config.is_some() {
        return Err(invalid(mode, "runtime config is unnecessary"));
    }
    if opts.dag_execution_id == 0 {
        return Err(invalid(mode, "DAG execution ID is required"));
    }
    if opts.dag_context_id == 0 {
        return Err(invalid(mode, "DAG context ID is required"));
    }
    Ok(ContainerArgs { component, task })
}
