// src/metadata/memory.rs

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::context::InvocationContext;
use crate::spec::{RuntimeArtifact, Value};

use super::{
    ArtifactRecord, Dag, DagContext, Execution, ExecutionConfig, MetadataStore, Pipeline,
    PipelineKey, StoreError, StoreFuture,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunContext {
    id: i64,
    pipeline_ctx_id: i64,
    pipeline_name: String,
    run_id: String,
    namespace: String,
    run_resource: String,
    pipeline_root: String,
}

impl RunContext {
    fn pipeline(&self) -> Pipeline {
        Pipeline {
            pipeline_ctx_id: self.pipeline_ctx_id,
            run_ctx_id: self.id,
            pipeline_root: self.pipeline_root.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    last_id: i64,
    /// Pipeline name -> pipeline context id.
    #[serde(default)]
    pipelines: BTreeMap<String, i64>,
    #[serde(default)]
    runs: BTreeMap<i64, RunContext>,
    #[serde(default)]
    executions: BTreeMap<i64, Execution>,
    #[serde(default)]
    artifacts: BTreeMap<i64, ArtifactRecord>,
    /// Execution id -> output name -> artifact id.
    #[serde(default)]
    output_events: BTreeMap<i64, BTreeMap<String, i64>>,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn find_run(&self, pipeline_name: &str, run_id: &str) -> Option<&RunContext> {
        self.runs
            .values()
            .find(|r| r.pipeline_name == pipeline_name && r.run_id == run_id)
    }
}

/// In-process metadata store.
///
/// Cloning shares the underlying state. `load`/`save` persist a JSON snapshot
/// so consecutive CLI invocations (root DAG, then each task) see each other's
/// records.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let state: StoreState = serde_json::from_str(&contents)?;
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Load the snapshot at `path`, or start empty if there is none yet.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the snapshot to `path`.
    ///
    /// The JSON goes to a temporary file in the same directory that is then
    /// renamed over `path`, so readers see either the old or the new snapshot.
    /// Use a [`SnapshotLock`](super::SnapshotLock) when other processes share
    /// the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = self.with_state(|state| Ok(serde_json::to_string_pretty(state)?))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(?path, "saved metadata state");
        Ok(())
    }

    pub fn execution(&self, id: i64) -> Result<Option<Execution>, StoreError> {
        self.with_state(|state| Ok(state.executions.get(&id).cloned()))
    }

    pub fn executions(&self) -> Result<Vec<Execution>, StoreError> {
        self.with_state(|state| Ok(state.executions.values().cloned().collect()))
    }

    /// Record the outputs of an execution, as the executor does once a task
    /// finishes. Returns the store ids of the new artifacts by output name.
    pub fn publish_outputs(
        &self,
        execution_id: i64,
        parameters: BTreeMap<String, Value>,
        artifacts: BTreeMap<String, RuntimeArtifact>,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        self.with_state(|state| {
            if !state.executions.contains_key(&execution_id) {
                return Err(StoreError::NotFound(format!("execution {execution_id}")));
            }

            let mut ids = BTreeMap::new();
            for (name, artifact) in artifacts {
                let id = state.next_id();
                state.artifacts.insert(
                    id,
                    ArtifactRecord {
                        id,
                        uri: artifact.uri,
                        artifact_type: artifact.artifact_type,
                        metadata: artifact.metadata,
                    },
                );
                ids.insert(name, id);
            }
            state
                .output_events
                .entry(execution_id)
                .or_default()
                .extend(ids.iter().map(|(k, v)| (k.clone(), *v)));

            if let Some(execution) = state.executions.get_mut(&execution_id) {
                execution
                    .output_parameters
                    .get_or_insert_with(BTreeMap::new)
                    .extend(parameters);
            }
            Ok(ids)
        })
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store state lock poisoned".to_string()))?;
        f(&mut state)
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn get_pipeline<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        key: &'a PipelineKey,
    ) -> StoreFuture<'a, Pipeline> {
        Box::pin(async move {
            ctx.check("get pipeline")?;
            self.with_state(|state| {
                if let Some(run) = state.find_run(&key.pipeline_name, &key.run_id) {
                    return Ok(run.pipeline());
                }
                if key.pipeline_root.is_empty() {
                    return Err(StoreError::NotFound(format!(
                        "run context for pipeline {:?} run {:?}",
                        key.pipeline_name, key.run_id
                    )));
                }

                let pipeline_ctx_id = match state.pipelines.get(&key.pipeline_name) {
                    Some(id) => *id,
                    None => {
                        let id = state.next_id();
                        state.pipelines.insert(key.pipeline_name.clone(), id);
                        id
                    }
                };
                let run = RunContext {
                    id: state.next_id(),
                    pipeline_ctx_id,
                    pipeline_name: key.pipeline_name.clone(),
                    run_id: key.run_id.clone(),
                    namespace: key.namespace.clone(),
                    run_resource: key.run_resource.clone(),
                    pipeline_root: key.pipeline_root.clone(),
                };
                debug!(run_ctx_id = run.id, pipeline_ctx_id, "created run context");
                let pipeline = run.pipeline();
                state.runs.insert(run.id, run);
                Ok(pipeline)
            })
        })
    }

    fn get_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
        context_id: i64,
    ) -> StoreFuture<'a, Dag> {
        Box::pin(async move {
            ctx.check("get DAG")?;
            self.with_state(|state| {
                let execution = state
                    .executions
                    .get(&execution_id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(format!("execution {execution_id}")))?;
                let run = state
                    .runs
                    .get(&context_id)
                    .ok_or_else(|| StoreError::NotFound(format!("context {context_id}")))?;
                if !execution.context_ids.contains(&context_id) {
                    return Err(StoreError::Invalid(format!(
                        "execution {execution_id} is not associated with context {context_id}"
                    )));
                }
                Ok(Dag {
                    execution,
                    context: DagContext {
                        id: run.id,
                        name: run.run_id.clone(),
                        pipeline_root: run.pipeline_root.clone(),
                    },
                })
            })
        })
    }

    fn create_execution<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        pipeline: &'a Pipeline,
        config: ExecutionConfig,
    ) -> StoreFuture<'a, Execution> {
        Box::pin(async move {
            ctx.check("create execution")?;
            self.with_state(|state| {
                if !state.runs.contains_key(&pipeline.run_ctx_id) {
                    return Err(StoreError::NotFound(format!(
                        "context {}",
                        pipeline.run_ctx_id
                    )));
                }
                let execution = Execution {
                    id: state.next_id(),
                    task_name: config.task_name,
                    is_root_dag: config.is_root_dag,
                    context_ids: vec![pipeline.pipeline_ctx_id, pipeline.run_ctx_id],
                    input_parameters: config.input_parameters,
                    output_parameters: None,
                    input_artifact_ids: config.input_artifact_ids,
                    planned_outputs: config.output_artifacts,
                };
                state.executions.insert(execution.id, execution.clone());
                Ok(execution)
            })
        })
    }

    fn get_executions_in_dag<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        dag: &'a Dag,
    ) -> StoreFuture<'a, BTreeMap<String, Execution>> {
        Box::pin(async move {
            ctx.check("get executions in DAG")?;
            self.with_state(|state| {
                // Ascending ids, so a re-created task execution wins over older ones.
                Ok(state
                    .executions
                    .values()
                    .filter(|e| e.context_ids.contains(&dag.context.id))
                    .filter_map(|e| e.task_name.clone().map(|name| (name, e.clone())))
                    .collect())
            })
        })
    }

    fn get_output_artifacts_by_execution_id<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        execution_id: i64,
    ) -> StoreFuture<'a, BTreeMap<String, ArtifactRecord>> {
        Box::pin(async move {
            ctx.check("get output artifacts")?;
            self.with_state(|state| {
                let Some(events) = state.output_events.get(&execution_id) else {
                    return Ok(BTreeMap::new());
                };
                events
                    .iter()
                    .map(|(key, id)| {
                        state
                            .artifacts
                            .get(id)
                            .cloned()
                            .map(|a| (key.clone(), a))
                            .ok_or_else(|| {
                                StoreError::Invalid(format!(
                                    "output {key} of execution {execution_id} references missing artifact {id}"
                                ))
                            })
                    })
                    .collect()
            })
        })
    }
}
