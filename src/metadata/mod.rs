// src/metadata/mod.rs

//! Metadata-store collaborator.
//!
//! The driver never owns durable state: pipeline/run contexts, executions and
//! artifacts all live behind [`MetadataStore`]. Production deployments plug
//! in a client for their store; [`MemoryMetadataStore`] is an in-process
//! implementation that can be snapshotted to a JSON file between invocations.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::context::{Interrupted, InvocationContext};

pub mod memory;
pub mod model;
pub mod snapshot;

pub use memory::MemoryMetadataStore;
pub use model::{ArtifactRecord, Dag, DagContext, Execution, ExecutionConfig, Pipeline, PipelineKey};
pub use snapshot::SnapshotLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("metadata store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid metadata record: {0}")]
    Invalid(String),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Operations the driver consumes from the metadata store.
///
/// Implementations receive the invocation context so they can abort their own
/// IO; the driver additionally races every call against it.
pub trait MetadataStore: Send + Sync {
    /// Get or create the pipeline context and the run context.
    ///
    /// Idempotent by name: the same pipeline name + run id always yields the
    /// same pair of context ids.
    fn get_pipeline<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        key: &'a PipelineKey,
    ) -> StoreFuture<'a, Pipeline>;

    /// Fetch a DAG execution together with the context it scopes.
    fn get_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
        context_id: i64,
    ) -> StoreFuture<'a, Dag>;

    /// Record a new execution under the pipeline's contexts.
    fn create_execution<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        pipeline: &'a Pipeline,
        config: ExecutionConfig,
    ) -> StoreFuture<'a, Execution>;

    /// All task executions recorded in a DAG, keyed by task name.
    fn get_executions_in_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        dag: &'a Dag,
    ) -> StoreFuture<'a, BTreeMap<String, Execution>>;

    /// Output artifacts of an execution, keyed by output name.
    fn get_output_artifacts_by_execution_id<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
    ) -> StoreFuture<'a, BTreeMap<String, ArtifactRecord>>;
}
