// src/context.rs

//! Per-invocation cancellation and deadline.
//!
//! Every collaborator call (metadata store, cluster config) receives the
//! invocation's [`InvocationContext`] and is raced against it, so Ctrl-C or an
//! expired `--timeout-secs` aborts the invocation at the next await point.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a collaborator call was abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Interrupted {
    #[error("{op}: invocation cancelled")]
    Cancelled { op: String },

    #[error("{op}: deadline exceeded")]
    DeadlineExceeded { op: String },
}

#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Fail fast if the invocation is already cancelled or past its deadline.
    pub fn check(&self, op: &str) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled { op: op.to_string() });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupted::DeadlineExceeded { op: op.to_string() });
        }
        Ok(())
    }

    /// Run a collaborator future, abandoning it on cancellation or deadline.
    pub async fn run<T, E, F>(&self, op: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interrupted>,
    {
        self.check(op)?;

        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled { op: op.to_string() }.into()),
            _ = deadline => Err(Interrupted::DeadlineExceeded { op: op.to_string() }.into()),
            res = fut => res,
        }
    }
}
