// src/driver/root_dag.rs

use tracing::info;

use crate::config::ClusterConfig;
use crate::context::InvocationContext;
use crate::errors::{DriverError, Result};
use crate::metadata::{ExecutionConfig, MetadataStore, PipelineKey};
use crate::spec::{ExecutorInput, Inputs, RuntimeConfig};

use super::validate::validate_root_dag;
use super::{call_store, DriverMode, Execution, Options};

/// Create the root DAG execution that anchors a pipeline run.
///
/// Returns the execution id and the run context its tasks will be recorded
/// in. No work specification is returned: tasks resolve what they need from
/// the metadata store.
pub async fn root_dag(
    ctx: &InvocationContext,
    opts: &Options,
    store: &dyn MetadataStore,
    cluster: &dyn ClusterConfig,
) -> Result<Execution> {
    run_root_dag(ctx, opts, store, cluster)
        .await
        .map_err(|err| err.in_invocation(DriverMode::RootDag, opts.info()))
}

async fn run_root_dag(
    ctx: &InvocationContext,
    opts: &Options,
    store: &dyn MetadataStore,
    cluster: &dyn ClusterConfig,
) -> Result<Execution> {
    let args = validate_root_dag(opts)?;

    let pipeline_root =
        resolve_pipeline_root(ctx, args.runtime_config, &opts.namespace, cluster).await?;

    let key = PipelineKey {
        pipeline_name: opts.pipeline_name.clone(),
        run_id: opts.run_id.clone(),
        namespace: opts.namespace.clone(),
        run_resource: run_resource(&opts.namespace, &opts.run_id),
        pipeline_root,
    };
    let pipeline = call_store(
        ctx,
        format!(
            "get pipeline {:?} run {:?}",
            opts.pipeline_name, opts.run_id
        ),
        store.get_pipeline(ctx, &key),
    )
    .await?;

    let executor_input = ExecutorInput {
        inputs: Inputs {
            parameters: args.runtime_config.parameters.clone(),
            ..Inputs::default()
        },
        outputs: None,
    };
    let mut config = ExecutionConfig::from_executor_input(&executor_input).map_err(|source| {
        DriverError::Store {
            op: "generate execution config".to_string(),
            source,
        }
    })?;
    config.is_root_dag = true;

    let execution = call_store(
        ctx,
        format!("create root DAG execution in context {}", pipeline.run_ctx_id),
        store.create_execution(ctx, &pipeline, config),
    )
    .await?;
    info!(
        execution_id = execution.id,
        context_id = pipeline.run_ctx_id,
        "created root DAG execution"
    );

    Ok(Execution {
        id: execution.id,
        context: Some(pipeline.run_ctx_id),
        executor_input: None,
    })
}

/// The run's explicit output directory, or the namespace default from cluster
/// configuration.
async fn resolve_pipeline_root(
    ctx: &InvocationContext,
    runtime_config: &RuntimeConfig,
    namespace: &str,
    cluster: &dyn ClusterConfig,
) -> Result<String> {
    if !runtime_config.gcs_output_directory.is_empty() {
        info!(pipeline_root = %runtime_config.gcs_output_directory, "using pipeline root from runtime config");
        return Ok(runtime_config.gcs_output_directory.clone());
    }

    let root = ctx
        .run(
            "get default pipeline root",
            cluster.default_pipeline_root(ctx, namespace),
        )
        .await
        .map_err(|source| DriverError::ClusterConfig {
            namespace: namespace.to_string(),
            source,
        })?;
    info!(pipeline_root = %root, namespace, "using default pipeline root from cluster config");
    Ok(root)
}

fn run_resource(namespace: &str, run_id: &str) -> String {
    format!("namespaces/{namespace}/runs/{run_id}")
}
