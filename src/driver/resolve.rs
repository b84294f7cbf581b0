// src/driver/resolve.rs

//! Input resolution.
//!
//! Turns a task's declared input bindings into concrete values:
//! - component input references read the parent DAG's own input parameters,
//! - producer-task references read sibling executions in the parent DAG,
//! - constants are copied as declared.
//!
//! Bindings the driver does not support yet fail explicitly rather than being
//! skipped.

use std::collections::BTreeMap;

use tracing::debug;

use crate::context::InvocationContext;
use crate::errors::{DriverError, InputKind, ResolveError, Result};
use crate::metadata::{self, Dag, MetadataStore};
use crate::spec::{
    ArtifactBinding, ArtifactList, InputArtifactSpec, InputParameterSpec, Inputs,
    ParameterBinding, RuntimeArtifact, TaskSpec, Value, ValueOrRuntimeParameter,
};

type TaskMap = BTreeMap<String, metadata::Execution>;

/// Lazily fetched sibling executions of one DAG, keyed by task name.
///
/// Lives for a single resolution: the first producer lookup lists the DAG's
/// executions and every later lookup reuses that list.
struct DagTasks<'a> {
    ctx: &'a InvocationContext,
    store: &'a dyn MetadataStore,
    dag: &'a Dag,
    tasks: Option<TaskMap>,
}

impl<'a> DagTasks<'a> {
    fn new(ctx: &'a InvocationContext, store: &'a dyn MetadataStore, dag: &'a Dag) -> Self {
        Self {
            ctx,
            store,
            dag,
            tasks: None,
        }
    }

    async fn get_or_fetch(&mut self) -> std::result::Result<&TaskMap, ResolveError> {
        let tasks = match self.tasks.take() {
            Some(tasks) => tasks,
            None => {
                let tasks = self
                    .ctx
                    .run(
                        "get executions in DAG",
                        self.store.get_executions_in_dag(self.ctx, self.dag),
                    )
                    .await?;
                debug!(
                    dag_context_id = self.dag.context.id,
                    tasks = ?tasks.keys().collect::<Vec<_>>(),
                    "fetched DAG tasks"
                );
                tasks
            }
        };
        Ok(self.tasks.insert(tasks))
    }

    async fn producer(
        &mut self,
        producer_task: &str,
    ) -> std::result::Result<&metadata::Execution, ResolveError> {
        self.get_or_fetch()
            .await?
            .get(producer_task)
            .ok_or_else(|| ResolveError::ProducerNotFound(producer_task.to_string()))
    }
}

/// Resolve every declared parameter and artifact input of `task`.
///
/// Parameters are resolved before artifacts, each in name order; the first
/// failure aborts resolution.
pub async fn resolve_inputs(
    ctx: &InvocationContext,
    dag: &Dag,
    task: &TaskSpec,
    store: &dyn MetadataStore,
) -> Result<Inputs> {
    let dag_inputs = dag.execution.input_parameters();
    debug!(?dag_inputs, "parent DAG input parameters");

    let mut tasks = DagTasks::new(ctx, store, dag);
    let mut inputs = Inputs::default();

    for (name, spec) in &task.inputs.parameters {
        let value = resolve_parameter(spec, dag_inputs, &mut tasks)
            .await
            .map_err(|source| DriverError::Resolution {
                kind: InputKind::Parameter,
                name: name.clone(),
                spec: spec.to_string(),
                source,
            })?;
        inputs.parameters.insert(name.clone(), value);
    }

    for (name, spec) in &task.inputs.artifacts {
        let list = resolve_artifact(spec, &mut tasks)
            .await
            .map_err(|source| DriverError::Resolution {
                kind: InputKind::Artifact,
                name: name.clone(),
                spec: spec.to_string(),
                source,
            })?;
        inputs.artifacts.insert(name.clone(), list);
    }

    Ok(inputs)
}

async fn resolve_parameter(
    spec: &InputParameterSpec,
    dag_inputs: &BTreeMap<String, Value>,
    tasks: &mut DagTasks<'_>,
) -> std::result::Result<Value, ResolveError> {
    if !spec.parameter_expression_selector.is_empty() {
        return Err(ResolveError::NotImplemented(
            "parameter expression selector".to_string(),
        ));
    }

    match &spec.kind {
        Some(ParameterBinding::ComponentInputParameter(component_input)) => {
            if component_input.is_empty() {
                return Err(ResolveError::EmptyComponentInput);
            }
            dag_inputs
                .get(component_input)
                .cloned()
                .ok_or_else(|| ResolveError::MissingComponentInput(component_input.clone()))
        }

        Some(ParameterBinding::TaskOutputParameter(task_output)) => {
            if task_output.producer_task.is_empty() {
                return Err(ResolveError::EmptyProducerTask);
            }
            if task_output.output_parameter_key.is_empty() {
                return Err(ResolveError::EmptyOutputKey(InputKind::Parameter));
            }
            let producer = tasks.producer(&task_output.producer_task).await?;
            let outputs = producer.output_parameters().ok_or_else(|| {
                ResolveError::ProducerWithoutOutputs(task_output.producer_task.clone())
            })?;
            outputs
                .get(&task_output.output_parameter_key)
                .cloned()
                .ok_or_else(|| ResolveError::MissingOutputKey {
                    kind: InputKind::Parameter,
                    key: task_output.output_parameter_key.clone(),
                    producer: task_output.producer_task.clone(),
                })
        }

        Some(ParameterBinding::RuntimeValue(ValueOrRuntimeParameter::ConstantValue(value))) => {
            Ok(value.clone())
        }

        Some(ParameterBinding::RuntimeValue(ValueOrRuntimeParameter::RuntimeParameter(_))) => Err(
            ResolveError::NotImplemented("runtime parameter value".to_string()),
        ),

        Some(ParameterBinding::TaskFinalStatus(_)) => Err(ResolveError::NotImplemented(
            "task final status parameter".to_string(),
        )),

        None => Err(ResolveError::NotImplemented(
            "parameter spec without a binding".to_string(),
        )),
    }
}

async fn resolve_artifact(
    spec: &InputArtifactSpec,
    tasks: &mut DagTasks<'_>,
) -> std::result::Result<ArtifactList, ResolveError> {
    match &spec.kind {
        // Artifacts cannot be passed in as pipeline-level inputs yet.
        Some(ArtifactBinding::ComponentInputArtifact(_)) => Err(ResolveError::NotImplemented(
            "component input artifact".to_string(),
        )),

        Some(ArtifactBinding::TaskOutputArtifact(task_output)) => {
            if task_output.producer_task.is_empty() {
                return Err(ResolveError::EmptyProducerTask);
            }
            if task_output.output_artifact_key.is_empty() {
                return Err(ResolveError::EmptyOutputKey(InputKind::Artifact));
            }
            let producer_id = tasks.producer(&task_output.producer_task).await?.id;

            let (ctx, store) = (tasks.ctx, tasks.store);
            let outputs = ctx
                .run(
                    "get output artifacts",
                    store.get_output_artifacts_by_execution_id(ctx, producer_id),
                )
                .await?;
            let record = outputs.get(&task_output.output_artifact_key).ok_or_else(|| {
                ResolveError::MissingOutputKey {
                    kind: InputKind::Artifact,
                    key: task_output.output_artifact_key.clone(),
                    producer: task_output.producer_task.clone(),
                }
            })?;
            Ok(ArtifactList::single(RuntimeArtifact::from(record)))
        }

        None => Err(ResolveError::NotImplemented(
            "artifact spec without a binding".to_string(),
        )),
    }
}
