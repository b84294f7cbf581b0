// src/driver/options.rs

use crate::spec::{ComponentSpec, RuntimeConfig, TaskSpec};

/// Everything one driver invocation is told about its DAG node.
///
/// Which fields must be set depends on the mode; see [`super::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// Pipeline context name. Required.
    pub pipeline_name: String,
    /// Run id. Required.
    pub run_id: String,
    /// Component definition of this node. Required.
    pub component: Option<ComponentSpec>,
    /// Root DAG only.
    pub runtime_config: Option<RuntimeConfig>,
    /// Task only.
    pub task: Option<TaskSpec>,
    /// Task only: the parent DAG's execution and context.
    pub dag_execution_id: i64,
    pub dag_context_id: i64,
    /// Root DAG only.
    pub namespace: String,
}

impl Options {
    pub fn task_name(&self) -> &str {
        self.task.as_ref().map(TaskSpec::name).unwrap_or_default()
    }

    /// One-line summary used to label errors.
    pub fn info(&self) -> String {
        let mut msg = format!(
            "pipelineName={}, runID={}",
            self.pipeline_name, self.run_id
        );
        if !self.task_name().is_empty() {
            msg.push_str(&format!(", task={:?}", self.task_name()));
        }
        if let Some(component_ref) = self
            .task
            .as_ref()
            .map(|t| t.component_ref.name.as_str())
            .filter(|n| !n.is_empty())
        {
            msg.push_str(&format!(", component={component_ref:?}"));
        }
        if self.dag_execution_id != 0 {
            msg.push_str(&format!(", dagExecutionID={}", self.dag_execution_id));
        }
        if self.dag_context_id != 0 {
            msg.push_str(&format!(", dagContextID={}", self.dag_context_id));
        }
        // Presence only; the contents can be large.
        if self.runtime_config.is_some() {
            msg.push_str(", runtimeConfig");
        }
        if self.component.as_ref().is_some_and(ComponentSpec::has_implementation) {
            msg.push_str(", componentSpec");
        }
        msg
    }
}
