// src/driver/container.rs

use tracing::info;

use crate::context::InvocationContext;
use crate::errors::{DriverError, Result};
use crate::metadata::{ExecutionConfig, MetadataStore, PipelineKey};
use crate::spec::ExecutorInput;

use super::outputs::provision_outputs;
use super::resolve::resolve_inputs;
use super::validate::validate_container;
use super::{call_store, DriverMode, Execution, Options};

/// Build the work specification for one task and record its execution.
///
/// The execution is only created once every input resolved and every output
/// was provisioned, so a failed invocation leaves nothing behind.
pub async fn container(
    ctx: &InvocationContext,
    opts: &Options,
    store: &dyn MetadataStore,
) -> Result<Execution> {
    run_container(ctx, opts, store)
        .await
        .map_err(|err| err.in_invocation(DriverMode::Container, opts.info()))
}

async fn run_container(
    ctx: &InvocationContext,
    opts: &Options,
    store: &dyn MetadataStore,
) -> Result<Execution> {
    let args = validate_container(opts)?;
    let task_name = args.task_name();

    // The root DAG driver already created the contexts; this is a lookup.
    let key = PipelineKey::lookup(&opts.pipeline_name, &opts.run_id);
    let pipeline = call_store(
        ctx,
        format!(
            "get pipeline {:?} run {:?}",
            opts.pipeline_name, opts.run_id
        ),
        store.get_pipeline(ctx, &key),
    )
    .await?;

    let dag = call_store(
        ctx,
        format!(
            "get DAG execution {} in context {}",
            opts.dag_execution_id, opts.dag_context_id
        ),
        store.get_dag(ctx, opts.dag_execution_id, opts.dag_context_id),
    )
    .await?;
    info!(
        dag_execution_id = dag.execution.id,
        dag_context_id = dag.context.id,
        pipeline_root = %dag.pipeline_root(),
        "parent DAG"
    );

    let inputs = resolve_inputs(ctx, &dag, args.task, store).await?;
    let outputs = provision_outputs(
        dag.pipeline_root(),
        task_name,
        &args.component.output_definitions,
    );
    let executor_input = ExecutorInput {
        inputs,
        outputs: Some(outputs),
    };

    let mut config = ExecutionConfig::from_executor_input(&executor_input).map_err(|source| {
        DriverError::Store {
            op: "generate execution config".to_string(),
            source,
        }
    })?;
    config.task_name = Some(task_name.to_string());

    let execution = call_store(
        ctx,
        format!(
            "create execution for task {task_name:?} in context {}",
            pipeline.run_ctx_id
        ),
        store.create_execution(ctx, &pipeline, config),
    )
    .await?;
    info!(execution_id = execution.id, task = task_name, "created task execution");

    Ok(Execution {
        id: execution.id,
        context: None,
        executor_input: Some(executor_input),
    })
}
