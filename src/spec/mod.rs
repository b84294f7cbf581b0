// src/spec/mod.rs

//! Pipeline specification data contract.
//!
//! These types mirror the JSON form of the pipeline IR consumed by the driver:
//! - component definitions (`ComponentSpec`)
//! - a DAG node's input bindings (`TaskSpec`)
//! - the root runtime configuration (`RuntimeConfig`)
//! - the resolved payload handed to the executor (`ExecutorInput`)
//!
//! They are read-only inputs as far as the driver is concerned; resolution
//! only ever builds new values from them.

pub mod component;
pub mod executor_input;
pub mod task;
pub mod value;

pub use component::{
    ArtifactSpec, ArtifactTypeSchema, ComponentInputsSpec, ComponentOutputsSpec, ComponentSpec,
    Metadata, ParameterSpec, ParameterType,
};
pub use executor_input::{ArtifactList, ExecutorInput, Inputs, Outputs, RuntimeArtifact};
pub use task::{
    ArtifactBinding, ComponentRef, InputArtifactSpec, InputParameterSpec, ParameterBinding,
    PipelineTaskInfo, RuntimeConfig, TaskFinalStatusSpec, TaskInputsSpec,
    TaskOutputArtifactSpec, TaskOutputParameterSpec, TaskSpec, ValueOrRuntimeParameter,
};
pub use value::Value;
