pub mod builders;
pub mod counting_store;
pub mod fake_cluster;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use pipeline_driver::logging::{build_filter, LOG_ENV};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a per-test subscriber using the driver's own filter rules.
///
/// Output is captured by the test harness and only shown for failing tests.
/// Turn a stage up with e.g.
/// `PIPELINE_DRIVER_LOG=pipeline_driver::driver::resolve=debug cargo test`.
/// Without the variable only warnings are shown.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let filter = match env.as_deref() {
            Some(directives) => build_filter(None, Some(directives))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
            None => EnvFilter::new("warn"),
        };

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Bound a driver call that may wait on a hung collaborator or a held lock.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("driver call did not finish within 5 seconds")
}
