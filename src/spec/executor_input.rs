// src/spec/executor_input.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ArtifactTypeSchema, Metadata, Value};

/// Fully resolved work specification handed to the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorInput {
    #[serde(default)]
    pub inputs: Inputs,

    /// Absent for the root DAG, which has no outputs to provision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Outputs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub artifacts: Vec<RuntimeArtifact>,
}

impl ArtifactList {
    pub fn single(artifact: RuntimeArtifact) -> Self {
        Self {
            artifacts: vec![artifact],
        }
    }
}

/// An artifact as the executor sees it.
///
/// For inputs, `name` carries the metadata-store id of the artifact; for
/// freshly provisioned outputs it is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeArtifact {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub uri: String,

    #[serde(rename = "type")]
    pub artifact_type: ArtifactTypeSchema,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}
