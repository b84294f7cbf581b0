// src/metadata/model.rs

//! Records exchanged with the metadata store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::{ArtifactTypeSchema, ExecutorInput, Metadata, RuntimeArtifact, Value};

use super::StoreError;

/// Identifies a pipeline run context.
///
/// `namespace`, `run_resource` and `pipeline_root` are only used when the
/// run context has to be created; a pure lookup leaves them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineKey {
    pub pipeline_name: String,
    pub run_id: String,
    pub namespace: String,
    pub run_resource: String,
    pub pipeline_root: String,
}

impl PipelineKey {
    pub fn lookup(pipeline_name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            run_id: run_id.into(),
            ..Self::default()
        }
    }
}

/// Handle to a pipeline context and one of its run contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub pipeline_ctx_id: i64,
    pub run_ctx_id: i64,
    pub pipeline_root: String,
}

/// Context scoping a DAG's executions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagContext {
    pub id: i64,
    pub name: String,
    pub pipeline_root: String,
}

/// A DAG execution plus its context.
#[derive(Debug, Clone, PartialEq)]
pub struct Dag {
    pub execution: Execution,
    pub context: DagContext,
}

impl Dag {
    /// Storage root under which all artifacts of this DAG are written.
    pub fn pipeline_root(&self) -> &str {
        &self.context.pipeline_root
    }
}

/// A recorded execution of one DAG node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: i64,

    /// Present for task executions; the root DAG has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,

    #[serde(default)]
    pub is_root_dag: bool,

    #[serde(default)]
    pub context_ids: Vec<i64>,

    #[serde(default)]
    pub input_parameters: BTreeMap<String, Value>,

    /// `None` until the executor publishes outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_parameters: Option<BTreeMap<String, Value>>,

    #[serde(default)]
    pub input_artifact_ids: BTreeMap<String, Vec<i64>>,

    /// Output locations planned by the driver.
    #[serde(default)]
    pub planned_outputs: BTreeMap<String, Vec<RuntimeArtifact>>,
}

impl Execution {
    pub fn input_parameters(&self) -> &BTreeMap<String, Value> {
        &self.input_parameters
    }

    pub fn output_parameters(&self) -> Option<&BTreeMap<String, Value>> {
        self.output_parameters.as_ref()
    }
}

/// What the store needs to create an execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionConfig {
    pub task_name: Option<String>,
    pub is_root_dag: bool,
    pub input_parameters: BTreeMap<String, Value>,
    pub input_artifact_ids: BTreeMap<String, Vec<i64>>,
    pub output_artifacts: BTreeMap<String, Vec<RuntimeArtifact>>,
}

impl ExecutionConfig {
    /// Derive the execution config from a resolved work specification.
    ///
    /// Input artifacts must carry their store id in `name`.
    pub fn from_executor_input(input: &ExecutorInput) -> Result<Self, StoreError> {
        let mut input_artifact_ids = BTreeMap::new();
        for (name, list) in &input.inputs.artifacts {
            let ids = list
                .artifacts
                .iter()
                .map(|a| {
                    a.name.parse::<i64>().map_err(|_| {
                        StoreError::Invalid(format!(
                            "input artifact {name} has non-numeric id {:?}",
                            a.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            input_artifact_ids.insert(name.clone(), ids);
        }

        let output_artifacts = input
            .outputs
            .as_ref()
            .map(|o| {
                o.artifacts
                    .iter()
                    .map(|(name, list)| (name.clone(), list.artifacts.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            task_name: None,
            is_root_dag: false,
            input_parameters: input.inputs.parameters.clone(),
            input_artifact_ids,
            output_artifacts,
        })
    }
}

/// An artifact as stored by the producer's execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: i64,
    pub uri: String,
    pub artifact_type: ArtifactTypeSchema,
    #[serde(default)]
    pub metadata: Metadata,
}

impl From<&ArtifactRecord> for RuntimeArtifact {
    fn from(record: &ArtifactRecord) -> Self {
        RuntimeArtifact {
            name: record.id.to_string(),
            uri: record.uri.clone(),
            artifact_type: record.artifact_type.clone(),
            metadata: record.metadata.clone(),
        }
    }
}
