#![allow(dead_code)]

use std::collections::BTreeMap;

use pipeline_driver::context::InvocationContext;
use pipeline_driver::driver::{self, Execution};
use pipeline_driver::metadata::{Dag, MemoryMetadataStore, MetadataStore};
use pipeline_driver::spec::{ArtifactTypeSchema, ComponentSpec, RuntimeArtifact, TaskSpec, Value};
use pipeline_driver_test_utils::builders::{container_options, root_options};
use pipeline_driver_test_utils::fake_cluster::StaticClusterConfig;

pub const PIPELINE_ROOT: &str = "gs://bucket/root";

/// Start a run: create the root DAG execution with the given parameters.
pub async fn start_run(store: &MemoryMetadataStore, parameters: BTreeMap<String, Value>) -> Execution {
    let ctx = InvocationContext::new();
    let opts = root_options(parameters, PIPELINE_ROOT);
    driver::root_dag(&ctx, &opts, store, &StaticClusterConfig::empty())
        .await
        .expect("root DAG driver should succeed")
}

/// Run the task driver for `task` under the run's root DAG.
pub async fn drive_task(
    store: &dyn MetadataStore,
    root: &Execution,
    task: TaskSpec,
    component: ComponentSpec,
) -> pipeline_driver::errors::Result<Execution> {
    let ctx = InvocationContext::new();
    let opts = container_options(task, component, root.id, root_context(root));
    driver::container(&ctx, &opts, store).await
}

/// Drive `task` and then publish outputs for it, as the executor would.
pub async fn complete_task(
    store: &MemoryMetadataStore,
    root: &Execution,
    task: TaskSpec,
    component: ComponentSpec,
    output_parameters: BTreeMap<String, Value>,
    output_artifacts: BTreeMap<String, RuntimeArtifact>,
) -> (Execution, BTreeMap<String, i64>) {
    let execution = drive_task(store, root, task, component)
        .await
        .expect("task driver should succeed");
    let ids = store
        .publish_outputs(execution.id, output_parameters, output_artifacts)
        .expect("publishing outputs should succeed");
    (execution, ids)
}

pub async fn root_dag_of(store: &MemoryMetadataStore, root: &Execution) -> Dag {
    let ctx = InvocationContext::new();
    store
        .get_dag(&ctx, root.id, root_context(root))
        .await
        .expect("root DAG should be readable")
}

pub fn root_context(root: &Execution) -> i64 {
    root.context.expect("root DAG execution carries a context")
}

pub fn artifact(uri: &str, schema_title: &str) -> RuntimeArtifact {
    RuntimeArtifact {
        name: String::new(),
        uri: uri.to_string(),
        artifact_type: ArtifactTypeSchema::titled(schema_title),
        metadata: Default::default(),
    }
}
