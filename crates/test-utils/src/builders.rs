#![allow(dead_code)]

use std::collections::BTreeMap;

use pipeline_driver::driver::Options;
use pipeline_driver::spec::{
    ArtifactBinding, ArtifactSpec, ArtifactTypeSchema, ComponentRef, ComponentSpec,
    InputArtifactSpec, InputParameterSpec, Metadata, ParameterBinding, ParameterSpec,
    ParameterType, PipelineTaskInfo, RuntimeConfig, TaskOutputArtifactSpec,
    TaskOutputParameterSpec, TaskSpec, Value, ValueOrRuntimeParameter,
};

/// Builder for `ComponentSpec`.
pub struct ComponentSpecBuilder {
    component: ComponentSpec,
}

impl ComponentSpecBuilder {
    pub fn new(executor_label: &str) -> Self {
        Self {
            component: ComponentSpec {
                executor_label: Some(executor_label.to_string()),
                ..ComponentSpec::default()
            },
        }
    }

    pub fn input_parameter(mut self, name: &str, parameter_type: ParameterType) -> Self {
        self.component
            .input_definitions
            .parameters
            .insert(name.to_string(), ParameterSpec { parameter_type });
        self
    }

    pub fn output_artifact(self, name: &str, schema_title: &str) -> Self {
        self.output_artifact_with_metadata(name, schema_title, Metadata::new())
    }

    pub fn output_artifact_with_metadata(
        mut self,
        name: &str,
        schema_title: &str,
        metadata: Metadata,
    ) -> Self {
        self.component.output_definitions.artifacts.insert(
            name.to_string(),
            ArtifactSpec {
                artifact_type: ArtifactTypeSchema::titled(schema_title),
                metadata,
            },
        );
        self
    }

    pub fn build(self) -> ComponentSpec {
        self.component
    }
}

/// Builder for `TaskSpec`.
pub struct TaskSpecBuilder {
    task: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskSpec {
                task_info: PipelineTaskInfo {
                    name: name.to_string(),
                },
                component_ref: ComponentRef {
                    name: format!("comp-{name}"),
                },
                ..TaskSpec::default()
            },
        }
    }

    pub fn parameter(mut self, name: &str, spec: InputParameterSpec) -> Self {
        self.task.inputs.parameters.insert(name.to_string(), spec);
        self
    }

    pub fn artifact(mut self, name: &str, spec: InputArtifactSpec) -> Self {
        self.task.inputs.artifacts.insert(name.to_string(), spec);
        self
    }

    pub fn component_input(self, name: &str, component_input: &str) -> Self {
        self.parameter(
            name,
            binding(ParameterBinding::ComponentInputParameter(
                component_input.to_string(),
            )),
        )
    }

    pub fn task_output(self, name: &str, producer_task: &str, key: &str) -> Self {
        self.parameter(
            name,
            binding(ParameterBinding::TaskOutputParameter(TaskOutputParameterSpec {
                producer_task: producer_task.to_string(),
                output_parameter_key: key.to_string(),
            })),
        )
    }

    pub fn constant(self, name: &str, value: impl Into<Value>) -> Self {
        self.parameter(
            name,
            binding(ParameterBinding::RuntimeValue(
                ValueOrRuntimeParameter::ConstantValue(value.into()),
            )),
        )
    }

    pub fn task_output_artifact(self, name: &str, producer_task: &str, key: &str) -> Self {
        self.artifact(
            name,
            InputArtifactSpec {
                kind: Some(ArtifactBinding::TaskOutputArtifact(TaskOutputArtifactSpec {
                    producer_task: producer_task.to_string(),
                    output_artifact_key: key.to_string(),
                })),
            },
        )
    }

    pub fn component_input_artifact(self, name: &str, component_input: &str) -> Self {
        self.artifact(
            name,
            InputArtifactSpec {
                kind: Some(ArtifactBinding::ComponentInputArtifact(
                    component_input.to_string(),
                )),
            },
        )
    }

    pub fn build(self) -> TaskSpec {
        self.task
    }
}

/// Parameter spec with the given binding and no selector.
pub fn binding(kind: ParameterBinding) -> InputParameterSpec {
    InputParameterSpec {
        kind: Some(kind),
        parameter_expression_selector: String::new(),
    }
}

/// Valid root DAG options with the given runtime parameters.
pub fn root_options(parameters: BTreeMap<String, Value>, pipeline_root: &str) -> Options {
    Options {
        pipeline_name: "my-pipeline".to_string(),
        run_id: "run-1".to_string(),
        component: Some(ComponentSpec::default()),
        runtime_config: Some(RuntimeConfig {
            parameters,
            gcs_output_directory: pipeline_root.to_string(),
        }),
        namespace: "kubeflow".to_string(),
        ..Options::default()
    }
}

/// Valid task options for `task` under the given parent DAG.
pub fn container_options(
    task: TaskSpec,
    component: ComponentSpec,
    dag_execution_id: i64,
    dag_context_id: i64,
) -> Options {
    Options {
        pipeline_name: "my-pipeline".to_string(),
        run_id: "run-1".to_string(),
        component: Some(component),
        task: Some(task),
        dag_execution_id,
        dag_context_id,
        ..Options::default()
    }
}

/// Build a parameter map from `(name, value)` pairs.
pub fn params<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
