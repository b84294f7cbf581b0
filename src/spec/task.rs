// src/spec/task.rs

//! A DAG node's input bindings, plus the root runtime configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// One task (DAG node) as declared in its parent DAG.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default)]
    pub task_info: PipelineTaskInfo,

    #[serde(default)]
    pub component_ref: ComponentRef,

    #[serde(default)]
    pub inputs: TaskInputsSpec,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependent_tasks: Vec<String>,
}

impl TaskSpec {
    pub fn name(&self) -> &str {
        &self.task_info.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTaskInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    #[serde(default)]
    pub name: String,
}

/// Declared inputs of a task, keyed by the input's name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInputsSpec {
    #[serde(default)]
    pub parameters: BTreeMap<String, InputParameterSpec>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, InputArtifactSpec>,
}

/// Binding for one input parameter.
///
/// `kind` is the flattened oneof, so `{"componentInputParameter": "epochs"}`
/// deserializes to `Some(ParameterBinding::ComponentInputParameter(..))` and
/// an object without any known binding key leaves it `None`. A known key with
/// a malformed payload, or more than one binding key, is a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawInputParameterSpec")]
pub struct InputParameterSpec {
    #[serde(flatten)]
    pub kind: Option<ParameterBinding>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameter_expression_selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterBinding {
    /// Name of one of the parent DAG's input parameters.
    ComponentInputParameter(String),
    TaskOutputParameter(TaskOutputParameterSpec),
    RuntimeValue(ValueOrRuntimeParameter),
    TaskFinalStatus(TaskFinalStatusSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutputParameterSpec {
    #[serde(default)]
    pub producer_task: String,
    #[serde(default)]
    pub output_parameter_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueOrRuntimeParameter {
    ConstantValue(Value),
    RuntimeParameter(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFinalStatusSpec {
    #[serde(default)]
    pub producer_task: String,
}

/// Binding for one input artifact. Decoded like [`InputParameterSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInputArtifactSpec")]
pub struct InputArtifactSpec {
    #[serde(flatten)]
    pub kind: Option<ArtifactBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactBinding {
    ComponentInputArtifact(String),
    TaskOutputArtifact(TaskOutputArtifactSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutputArtifactSpec {
    #[serde(default)]
    pub producer_task: String,
    #[serde(default)]
    pub output_artifact_key: String,
}

// Every binding key is decoded on its own so payload errors surface instead
// of collapsing the whole oneof to `None`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInputParameterSpec {
    component_input_parameter: Option<String>,
    task_output_parameter: Option<TaskOutputParameterSpec>,
    runtime_value: Option<ValueOrRuntimeParameter>,
    task_final_status: Option<TaskFinalStatusSpec>,
    #[serde(default)]
    parameter_expression_selector: String,
}

impl TryFrom<RawInputParameterSpec> for InputParameterSpec {
    type Error = String;

    fn try_from(raw: RawInputParameterSpec) -> Result<Self, Self::Error> {
        let kind = at_most_one([
            raw.component_input_parameter
                .map(ParameterBinding::ComponentInputParameter),
            raw.task_output_parameter
                .map(ParameterBinding::TaskOutputParameter),
            raw.runtime_value.map(ParameterBinding::RuntimeValue),
            raw.task_final_status.map(ParameterBinding::TaskFinalStatus),
        ])?;
        Ok(Self {
            kind,
            parameter_expression_selector: raw.parameter_expression_selector,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInputArtifactSpec {
    component_input_artifact: Option<String>,
    task_output_artifact: Option<TaskOutputArtifactSpec>,
}

impl TryFrom<RawInputArtifactSpec> for InputArtifactSpec {
    type Error = String;

    fn try_from(raw: RawInputArtifactSpec) -> Result<Self, Self::Error> {
        let kind = at_most_one([
            raw.component_input_artifact
                .map(ArtifactBinding::ComponentInputArtifact),
            raw.task_output_artifact.map(ArtifactBinding::TaskOutputArtifact),
        ])?;
        Ok(Self { kind })
    }
}

fn at_most_one<T, const N: usize>(bindings: [Option<T>; N]) -> Result<Option<T>, String> {
    let mut set = bindings.into_iter().flatten();
    let first = set.next();
    if set.next().is_some() {
        return Err("more than one binding is set".to_string());
    }
    Ok(first)
}

// Bindings print as their JSON form so error messages show exactly what was declared.
impl fmt::Display for InputParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Display for InputArtifactSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Runtime configuration supplied by the user when a run is created.
///
/// Only the root DAG driver consumes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,

    /// Explicit artifact storage root for the run; empty means "use the
    /// cluster default".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gcs_output_directory: String,
}
