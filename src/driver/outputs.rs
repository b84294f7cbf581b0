// src/driver/outputs.rs

//! Output artifact provisioning.
//!
//! Output locations are a pure function of (pipeline root, task name,
//! artifact name), so anything that knows those three values can recompute
//! where a task wrote its artifacts.

use crate::spec::{ArtifactList, ComponentOutputsSpec, Outputs, RuntimeArtifact};

/// Provision one output location per declared output artifact.
pub fn provision_outputs(
    pipeline_root: &str,
    task_name: &str,
    outputs_spec: &ComponentOutputsSpec,
) -> Outputs {
    let artifacts = outputs_spec
        .artifacts
        .iter()
        .map(|(name, artifact)| {
            let runtime_artifact = RuntimeArtifact {
                name: String::new(),
                uri: generate_output_uri(pipeline_root, name, task_name),
                artifact_type: artifact.artifact_type.clone(),
                metadata: artifact.metadata.clone(),
            };
            (name.clone(), ArtifactList::single(runtime_artifact))
        })
        .collect();
    Outputs { artifacts }
}

/// `<root>/<task>/<artifact>`.
///
/// The root is only stripped of trailing slashes and otherwise kept verbatim:
/// cleaning it as a path would turn `gs://bucket` into `gs:/bucket`. Only the
/// task/artifact part is cleaned.
pub fn generate_output_uri(root: &str, artifact_name: &str, task_name: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        join_segments(&[task_name, artifact_name])
    )
}

fn join_segments(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }
    clean_path(&joined)
}

/// Lexical path cleanup: drops empty and `.` segments and folds `..`.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let body = segments.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}
