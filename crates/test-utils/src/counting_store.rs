use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use pipeline_driver::context::InvocationContext;
use pipeline_driver::metadata::{
    ArtifactRecord, Dag, Execution, ExecutionConfig, MetadataStore, Pipeline, PipelineKey,
    StoreError, StoreFuture,
};

pub const GET_PIPELINE: &str = "get_pipeline";
pub const GET_DAG: &str = "get_dag";
pub const CREATE_EXECUTION: &str = "create_execution";
pub const GET_EXECUTIONS_IN_DAG: &str = "get_executions_in_dag";
pub const GET_OUTPUT_ARTIFACTS: &str = "get_output_artifacts_by_execution_id";

/// Store wrapper that:
/// - counts every call per operation
/// - optionally fails one operation with `StoreError::Unavailable`
/// - optionally never completes one operation (for cancellation tests)
#[derive(Debug, Clone)]
pub struct CountingStore<S> {
    inner: S,
    calls: Arc<Mutex<BTreeMap<&'static str, usize>>>,
    fail_on: Option<&'static str>,
    hang_on: Option<&'static str>,
}

impl<S: MetadataStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::default(),
            fail_on: None,
            hang_on: None,
        }
    }

    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn hanging_on(mut self, op: &'static str) -> Self {
        self.hang_on = Some(op);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn intercept<'a, T: Send + 'a>(&self, op: &'static str) -> Option<StoreFuture<'a, T>> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;

        if self.fail_on == Some(op) {
            return Some(Box::pin(async move {
                Err(StoreError::Unavailable(format!("injected failure in {op}")))
            }));
        }
        if self.hang_on == Some(op) {
            return Some(Box::pin(std::future::pending()));
        }
        None
    }
}

impl<S: MetadataStore> MetadataStore for CountingStore<S> {
    fn get_pipeline<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        key: &'a PipelineKey,
    ) -> StoreFuture<'a, Pipeline> {
        self.intercept(GET_PIPELINE)
            .unwrap_or_else(|| self.inner.get_pipeline(ctx, key))
    }

    fn get_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
        context_id: i64,
    ) -> StoreFuture<'a, Dag> {
        self.intercept(GET_DAG)
            .unwrap_or_else(|| self.inner.get_dag(ctx, execution_id, context_id))
    }

    fn create_execution<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        pipeline: &'a Pipeline,
        config: ExecutionConfig,
    ) -> StoreFuture<'a, Execution> {
        match self.intercept(CREATE_EXECUTION) {
            Some(fut) => fut,
            None => self.inner.create_execution(ctx, pipeline, config),
        }
    }

    fn get_executions_in_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        dag: &'a Dag,
    ) -> StoreFuture<'a, BTreeMap<String, Execution>> {
        self.intercept(GET_EXECUTIONS_IN_DAG)
            .unwrap_or_else(|| self.inner.get_executions_in_dag(ctx, dag))
    }

    fn get_output_artifacts_by_execution_id<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
    ) -> StoreFuture<'a, BTreeMap<String, ArtifactRecord>> {
        self.intercept(GET_OUTPUT_ARTIFACTS)
            .unwrap_or_else(|| self.inner.get_output_artifacts_by_execution_id(ctx, execution_id))
    }
}
