mod common;

use pipeline_driver::config::ConfigError;
use pipeline_driver::context::InvocationContext;
use pipeline_driver::driver::{self, DriverMode};
use pipeline_driver::errors::DriverError;
use pipeline_driver::metadata::{MemoryMetadataStore, MetadataStore, StoreError};
use pipeline_driver::spec::Value;
use pipeline_driver_test_utils::builders::{params, root_options};
use pipeline_driver_test_utils::counting_store::{CountingStore, CREATE_EXECUTION, GET_PIPELINE};
use pipeline_driver_test_utils::fake_cluster::StaticClusterConfig;
use pipeline_driver_test_utils::init_tracing;

use common::{root_context, root_dag_of, PIPELINE_ROOT};

#[tokio::test]
async fn creates_root_execution_with_runtime_parameters() {
    init_tracing();
    let store = MemoryMetadataStore::new();
    let cluster = StaticClusterConfig::with_root("minio://default");
    let opts = root_options(
        params([("epochs", Value::Int(10)), ("lr", Value::Double(0.01))]),
        PIPELINE_ROOT,
    );

    let execution = driver::root_dag(&InvocationContext::new(), &opts, &store, &cluster)
        .await
        .unwrap();

    assert!(execution.executor_input.is_none());
    let dag = root_dag_of(&store, &execution).await;
    assert!(dag.execution.is_root_dag);
    assert_eq!(dag.execution.task_name, None);
    assert_eq!(dag.execution.input_parameters()["epochs"], Value::Int(10));
    assert_eq!(dag.execution.input_parameters()["lr"], Value::Double(0.01));
    assert_eq!(dag.pipeline_root(), PIPELINE_ROOT);

    // An explicit output directory never consults the cluster.
    assert_eq!(cluster.lookups(), 0);
}

#[tokio::test]
async fn falls_back_to_cluster_default_pipeline_root() {
    let store = MemoryMetadataStore::new();
    let cluster = StaticClusterConfig::with_root("minio://mlpipeline/v2/artifacts");
    let opts = root_options(params([]), "");

    let execution = driver::root_dag(&InvocationContext::new(), &opts, &store, &cluster)
        .await
        .unwrap();

    assert_eq!(cluster.lookups(), 1);
    let dag = root_dag_of(&store, &execution).await;
    assert_eq!(dag.pipeline_root(), "minio://mlpipeline/v2/artifacts");
}

#[tokio::test]
async fn missing_default_pipeline_root_is_fatal() {
    let store = CountingStore::new(MemoryMetadataStore::new());
    let opts = root_options(params([]), "");

    let err = driver::root_dag(
        &InvocationContext::new(),
        &opts,
        &store,
        &StaticClusterConfig::empty(),
    )
    .await
    .unwrap_err();

    match err.inner() {
        DriverError::ClusterConfig { namespace, source } => {
            assert_eq!(namespace, "kubeflow");
            assert!(matches!(source, ConfigError::MissingDefault(ns) if ns == "kubeflow"));
        }
        other => panic!("Expected ClusterConfig error, got: {:?}", other),
    }
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn same_run_maps_to_the_same_contexts() {
    let store = MemoryMetadataStore::new();
    let cluster = StaticClusterConfig::empty();
    let ctx = InvocationContext::new();
    let opts = root_options(params([]), PIPELINE_ROOT);

    let first = driver::root_dag(&ctx, &opts, &store, &cluster).await.unwrap();
    let second = driver::root_dag(&ctx, &opts, &store, &cluster).await.unwrap();

    assert_eq!(first.context, second.context);
    assert_ne!(first.id, second.id);

    // A different run of the same pipeline gets its own run context.
    let mut other_run = opts.clone();
    other_run.run_id = "run-2".to_string();
    let third = driver::root_dag(&ctx, &other_run, &store, &cluster)
        .await
        .unwrap();
    assert_ne!(third.context, first.context);

    let first_dag = root_dag_of(&store, &first).await;
    let third_dag = root_dag_of(&store, &third).await;
    // Both runs share the pipeline context.
    assert_eq!(
        first_dag.execution.context_ids[0],
        third_dag.execution.context_ids[0]
    );
    assert_eq!(root_context(&third), third_dag.context.id);
}

#[tokio::test]
async fn invalid_options_fail_before_any_collaborator_call() {
    let store = CountingStore::new(MemoryMetadataStore::new());
    let cluster = StaticClusterConfig::with_root("minio://default");
    let mut opts = root_options(params([]), "");
    opts.namespace.clear();

    let err = driver::root_dag(&InvocationContext::new(), &opts, &store, &cluster)
        .await
        .unwrap_err();

    assert!(matches!(
        err.inner(),
        DriverError::InvalidArgs { mode: DriverMode::RootDag, reason } if reason == "namespace is required"
    ));
    assert_eq!(store.total_calls(), 0);
    assert_eq!(cluster.lookups(), 0);
}

#[tokio::test]
async fn failures_are_labelled_with_invocation_details() {
    let store = CountingStore::new(MemoryMetadataStore::new()).failing_on(CREATE_EXECUTION);
    let opts = root_options(params([]), PIPELINE_ROOT);

    let err = driver::root_dag(
        &InvocationContext::new(),
        &opts,
        &store,
        &StaticClusterConfig::empty(),
    )
    .await
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("root DAG driver (pipelineName=my-pipeline, runID=run-1"), "{msg}");
    assert!(msg.contains("runtimeConfig"), "{msg}");
    assert!(msg.contains("injected failure in create_execution"), "{msg}");
    assert!(matches!(
        err.inner(),
        DriverError::Store { source: StoreError::Unavailable(_), .. }
    ));
    assert_eq!(store.calls(GET_PIPELINE), 1);
    assert!(store.inner().executions().unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_invocation_creates_nothing() {
    let store = MemoryMetadataStore::new();
    let ctx = InvocationContext::new();
    ctx.cancel();
    let opts = root_options(params([]), PIPELINE_ROOT);

    let err = driver::root_dag(&ctx, &opts, &store, &StaticClusterConfig::empty())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invocation cancelled"), "{err}");
    assert!(store.executions().unwrap().is_empty());

    // Nothing was recorded, so a task lookup of the run still fails.
    let lookup = pipeline_driver::metadata::PipelineKey::lookup("my-pipeline", "run-1");
    let res = store.get_pipeline(&InvocationContext::new(), &lookup).await;
    assert!(matches!(res, Err(StoreError::NotFound(_))));
}
