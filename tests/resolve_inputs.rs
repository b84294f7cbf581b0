mod common;

use std::collections::BTreeMap;

use pipeline_driver::context::InvocationContext;
use pipeline_driver::driver::resolve_inputs;
use pipeline_driver::errors::{DriverError, InputKind, ResolveError};
use pipeline_driver::metadata::MemoryMetadataStore;
use pipeline_driver::spec::{
    InputArtifactSpec, InputParameterSpec, ParameterBinding, TaskFinalStatusSpec, Value,
    ValueOrRuntimeParameter,
};
use pipeline_driver_test_utils::builders::{
    binding, params, ComponentSpecBuilder, TaskSpecBuilder,
};
use pipeline_driver_test_utils::counting_store::{
    CountingStore, GET_EXECUTIONS_IN_DAG, GET_OUTPUT_ARTIFACTS,
};
use pipeline_driver_test_utils::init_tracing;

use common::{artifact, complete_task, root_dag_of, start_run};

/// A run whose root DAG has `epochs = 10` and a finished `train` task with
/// `accuracy = 0.95`, `loss = 0.1` and a `model` artifact.
async fn run_with_trained_model(store: &MemoryMetadataStore) -> pipeline_driver::driver::Execution {
    init_tracing();
    let root = start_run(store, params([("epochs", Value::Int(10))])).await;
    complete_task(
        store,
        &root,
        TaskSpecBuilder::new("train").build(),
        ComponentSpecBuilder::new("exec-train")
            .output_artifact("model", "system.Model")
            .build(),
        params([("accuracy", Value::Double(0.95)), ("loss", Value::Double(0.1))]),
        BTreeMap::from([(
            "model".to_string(),
            artifact("gs://bucket/root/train/model", "system.Model"),
        )]),
    )
    .await;
    root
}

fn resolution_error(err: DriverError) -> (InputKind, String, ResolveError) {
    match err {
        DriverError::Resolution {
            kind, name, source, ..
        } => (kind, name, source),
        other => panic!("Expected Resolution error, got: {:?}", other),
    }
}

#[tokio::test]
async fn resolves_producer_task_output_parameter() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .task_output("acc", "train", "accuracy")
        .build();
    let inputs = resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
        .await
        .unwrap();

    assert_eq!(inputs.parameters["acc"], Value::Double(0.95));
}

#[tokio::test]
async fn resolves_component_input_from_parent_dag() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .component_input("num_epochs", "epochs")
        .build();
    let inputs = resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
        .await
        .unwrap();

    assert_eq!(inputs.parameters["num_epochs"], Value::Int(10));
}

#[tokio::test]
async fn constant_resolves_without_store_calls() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;
    let counting = CountingStore::new(store.clone());

    let task = TaskSpecBuilder::new("evaluate").constant("lr", 0.01).build();
    let inputs = resolve_inputs(&InvocationContext::new(), &dag, &task, &counting)
        .await
        .unwrap();

    assert_eq!(inputs.parameters["lr"], Value::Double(0.01));
    assert_eq!(counting.total_calls(), 0);
}

#[tokio::test]
async fn sibling_executions_are_fetched_once_per_resolution() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;
    let counting = CountingStore::new(store.clone());

    let task = TaskSpecBuilder::new("evaluate")
        .task_output("acc", "train", "accuracy")
        .task_output("loss", "train", "loss")
        .task_output_artifact("model", "train", "model")
        .build();
    let inputs = resolve_inputs(&InvocationContext::new(), &dag, &task, &counting)
        .await
        .unwrap();

    assert_eq!(inputs.parameters.len(), 2);
    assert_eq!(counting.calls(GET_EXECUTIONS_IN_DAG), 1);
    assert_eq!(counting.calls(GET_OUTPUT_ARTIFACTS), 1);

    // A second resolution starts with a fresh cache.
    counting.reset();
    resolve_inputs(&InvocationContext::new(), &dag, &task, &counting)
        .await
        .unwrap();
    assert_eq!(counting.calls(GET_EXECUTIONS_IN_DAG), 1);
}

#[tokio::test]
async fn resolves_producer_task_output_artifact() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .task_output_artifact("model_in", "train", "model")
        .build();
    let inputs = resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
        .await
        .unwrap();

    let list = &inputs.artifacts["model_in"].artifacts;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].uri, "gs://bucket/root/train/model");
    assert_eq!(list[0].artifact_type.schema_title, "system.Model");
    assert!(list[0].name.parse::<i64>().is_ok());
}

#[tokio::test]
async fn missing_producer_task_names_the_task() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .task_output("acc", "preprocess", "accuracy")
        .build();
    let err = resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("\"preprocess\""));
    let (kind, name, source) = resolution_error(err);
    assert_eq!(kind, InputKind::Parameter);
    assert_eq!(name, "acc");
    assert!(matches!(source, ResolveError::ProducerNotFound(t) if t == "preprocess"));
}

#[tokio::test]
async fn missing_component_input_and_output_key_fail() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;
    let ctx = InvocationContext::new();

    let task = TaskSpecBuilder::new("evaluate")
        .component_input("batch", "batch_size")
        .build();
    let (_, _, source) = resolution_error(resolve_inputs(&ctx, &dag, &task, &store).await.unwrap_err());
    assert!(matches!(source, ResolveError::MissingComponentInput(n) if n == "batch_size"));

    let task = TaskSpecBuilder::new("evaluate")
        .task_output("f1", "train", "f1")
        .build();
    let (_, _, source) = resolution_error(resolve_inputs(&ctx, &dag, &task, &store).await.unwrap_err());
    assert!(matches!(
        source,
        ResolveError::MissingOutputKey { kind: InputKind::Parameter, ref key, .. } if key == "f1"
    ));

    let task = TaskSpecBuilder::new("evaluate")
        .task_output_artifact("data", "train", "dataset")
        .build();
    let (kind, _, source) = resolution_error(resolve_inputs(&ctx, &dag, &task, &store).await.unwrap_err());
    assert_eq!(kind, InputKind::Artifact);
    assert!(matches!(
        source,
        ResolveError::MissingOutputKey { kind: InputKind::Artifact, .. }
    ));
}

#[tokio::test]
async fn producer_without_published_outputs_fails() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    // `prep` has an execution but the executor never published its outputs.
    common::drive_task(
        &store,
        &root,
        TaskSpecBuilder::new("prep").build(),
        ComponentSpecBuilder::new("exec-prep").build(),
    )
    .await
    .unwrap();
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .task_output("rows", "prep", "rows")
        .build();
    let (_, _, source) = resolution_error(
        resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
            .await
            .unwrap_err(),
    );
    assert!(matches!(source, ResolveError::ProducerWithoutOutputs(t) if t == "prep"));
}

#[tokio::test]
async fn empty_references_fail_before_any_store_call() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;
    let counting = CountingStore::new(store.clone());
    let ctx = InvocationContext::new();

    let cases = [
        (
            TaskSpecBuilder::new("t").component_input("x", "").build(),
            "empty component input",
        ),
        (
            TaskSpecBuilder::new("t").task_output("x", "", "k").build(),
            "producer task is empty",
        ),
        (
            TaskSpecBuilder::new("t").task_output("x", "train", "").build(),
            "output parameter key is empty",
        ),
        (
            TaskSpecBuilder::new("t").task_output_artifact("x", "train", "").build(),
            "output artifact key is empty",
        ),
    ];
    for (task, expected) in cases {
        let (_, _, source) = resolution_error(
            resolve_inputs(&ctx, &dag, &task, &counting).await.unwrap_err(),
        );
        assert_eq!(source.to_string(), expected);
    }
    assert_eq!(counting.total_calls(), 0);
}

#[tokio::test]
async fn unimplemented_bindings_fail_explicitly() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;
    let ctx = InvocationContext::new();

    let with_selector = InputParameterSpec {
        kind: Some(ParameterBinding::ComponentInputParameter("epochs".to_string())),
        parameter_expression_selector: "parseJson(string_value)".to_string(),
    };
    let tasks = [
        TaskSpecBuilder::new("t").parameter("p", with_selector).build(),
        TaskSpecBuilder::new("t")
            .parameter(
                "p",
                binding(ParameterBinding::TaskFinalStatus(TaskFinalStatusSpec {
                    producer_task: "train".to_string(),
                })),
            )
            .build(),
        TaskSpecBuilder::new("t")
            .parameter(
                "p",
                binding(ParameterBinding::RuntimeValue(
                    ValueOrRuntimeParameter::RuntimeParameter("epochs".to_string()),
                )),
            )
            .build(),
        TaskSpecBuilder::new("t")
            .parameter("p", InputParameterSpec::default())
            .build(),
        TaskSpecBuilder::new("t")
            .component_input_artifact("dataset", "dataset")
            .build(),
        TaskSpecBuilder::new("t")
            .artifact("dataset", InputArtifactSpec::default())
            .build(),
    ];

    for task in tasks {
        let err = resolve_inputs(&ctx, &dag, &task, &store).await.unwrap_err();
        assert!(err.to_string().contains("not implemented"), "{err}");
        let (_, _, source) = resolution_error(err);
        assert!(matches!(source, ResolveError::NotImplemented(_)));
    }
}

#[tokio::test]
async fn resolution_error_carries_input_name_and_spec() {
    let store = MemoryMetadataStore::new();
    let root = run_with_trained_model(&store).await;
    let dag = root_dag_of(&store, &root).await;

    let task = TaskSpecBuilder::new("evaluate")
        .component_input_artifact("dataset", "raw_data")
        .build();
    let err = resolve_inputs(&InvocationContext::new(), &dag, &task, &store)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to resolve input artifact dataset with spec \
         {\"componentInputArtifact\":\"raw_data\"}: component input artifact not implemented yet"
    );
}
