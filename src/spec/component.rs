// src/spec/component.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form artifact metadata (a JSON object).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Declared inputs/outputs of a DAG node.
///
/// ```json
/// {
///   "inputDefinitions": { "parameters": { "epochs": { "type": "INT" } } },
///   "outputDefinitions": {
///     "artifacts": {
///       "model": { "artifactType": { "schemaTitle": "system.Model" } }
///     }
///   },
///   "executorLabel": "exec-train"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    #[serde(default)]
    pub input_definitions: ComponentInputsSpec,

    #[serde(default)]
    pub output_definitions: ComponentOutputsSpec,

    /// Implementation reference (executor label or DAG name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_label: Option<String>,
}

impl ComponentSpec {
    /// Whether the component carries an implementation at all.
    pub fn has_implementation(&self) -> bool {
        self.executor_label.as_deref().is_some_and(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentInputsSpec {
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutputsSpec {
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterType {
    String,
    Int,
    Double,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
}

/// A declared artifact slot: its type and the metadata it starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSpec {
    pub artifact_type: ArtifactTypeSchema,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactTypeSchema {
    pub schema_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

impl ArtifactTypeSchema {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            schema_title: title.into(),
            schema_version: None,
        }
    }
}
