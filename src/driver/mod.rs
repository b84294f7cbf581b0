// src/driver/mod.rs

//! The task driver.
//!
//! Runs once per DAG node:
//! - [`root_dag`] anchors a pipeline run with a root DAG execution built from
//!   the user's runtime parameters.
//! - [`container`] resolves one task's inputs against its parent DAG,
//!   provisions its output locations, records its execution and returns the
//!   work specification for the executor.
//!
//! Both are stateless across invocations; everything durable goes through the
//! [`MetadataStore`](crate::metadata::MetadataStore).

use std::fmt;

use crate::context::InvocationContext;
use crate::errors::{DriverError, Result};
use crate::metadata::{StoreError, StoreFuture};
use crate::spec::ExecutorInput;

pub mod container;
pub mod options;
pub mod outputs;
pub mod resolve;
pub mod root_dag;
pub mod validate;

pub use container::container;
pub use options::Options;
pub use outputs::{generate_output_uri, provision_outputs};
pub use resolve::resolve_inputs;
pub use root_dag::root_dag;
pub use validate::{validate, validate_container, validate_root_dag};

/// Which driver an invocation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    RootDag,
    Container,
}

impl fmt::Display for DriverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverMode::RootDag => f.write_str("root DAG"),
            DriverMode::Container => f.write_str("container"),
        }
    }
}

/// Result of a successful driver invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub id: i64,

    /// Only set for DAG executions: the context their child tasks run in.
    pub context: Option<i64>,

    /// Only set for tasks: the work specification for the executor. The root
    /// DAG does not return one because its tasks resolve from the store.
    pub executor_input: Option<ExecutorInput>,
}

/// Run a store call under the invocation context and label failures with `op`.
async fn call_store<T>(
    ctx: &InvocationContext,
    op: String,
    fut: StoreFuture<'_, T>,
) -> Result<T> {
    ctx.run(&op, fut)
        .await
        .map_err(|source: StoreError| DriverError::Store { op, source })
}
