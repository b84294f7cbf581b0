// src/errors.rs

//! Crate-wide error types.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::driver::DriverMode;
use crate::metadata::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Parameter,
    Artifact,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Parameter => f.write_str("parameter"),
            InputKind::Artifact => f.write_str("artifact"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("invalid {mode} driver args: {reason}")]
    InvalidArgs { mode: DriverMode, reason: String },

    #[error("failed to resolve input {kind} {name} with spec {spec}: {source}")]
    Resolution {
        kind: InputKind,
        name: String,
        spec: String,
        #[source]
        source: ResolveError,
    },

    #[error("{op}: {source}")]
    Store {
        op: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to get default pipeline root for namespace {namespace:?}: {source}")]
    ClusterConfig {
        namespace: String,
        #[source]
        source: ConfigError,
    },

    /// Top-level wrap carrying the invocation's identifying details.
    #[error("{mode} driver ({info}) failed: {source}")]
    Invocation {
        mode: DriverMode,
        info: String,
        #[source]
        source: Box<DriverError>,
    },
}

impl DriverError {
    /// Wrap with invocation details. Already wrapped errors are returned as is.
    pub fn in_invocation(self, mode: DriverMode, info: String) -> Self {
        match self {
            wrapped @ DriverError::Invocation { .. } => wrapped,
            other => DriverError::Invocation {
                mode,
                info,
                source: Box::new(other),
            },
        }
    }

    /// The error underneath the invocation wrap, if any.
    pub fn inner(&self) -> &DriverError {
        match self {
            DriverError::Invocation { source, .. } => source.inner(),
            other => other,
        }
    }
}

/// Why a single declared input could not be resolved.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("empty component input")]
    EmptyComponentInput,

    #[error("parent DAG does not have input parameter {0}")]
    MissingComponentInput(String),

    #[error("producer task is empty")]
    EmptyProducerTask,

    #[error("output {0} key is empty")]
    EmptyOutputKey(InputKind),

    #[error("cannot find producer task {0:?}")]
    ProducerNotFound(String),

    #[error("producer task {0:?} has no output parameters")]
    ProducerWithoutOutputs(String),

    #[error("cannot find output {kind} key {key:?} in producer task {producer:?}")]
    MissingOutputKey {
        kind: InputKind,
        key: String,
        producer: String,
    },

    #[error("{0} not implemented yet")]
    NotImplemented(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
