// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod driver;
pub mod errors;
pub mod logging;
pub mod metadata;
pub mod spec;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::FileClusterConfig;
use crate::context::InvocationContext;
use crate::driver::{DriverMode, Execution, Options};
use crate::metadata::SnapshotLock;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - argument decoding and validation
/// - the metadata store snapshot, locked from load through save
/// - cluster configuration (root DAG only)
/// - Ctrl-C / timeout cancellation
/// - writing the driver's outputs for the executor
pub async fn run(args: CliArgs) -> Result<()> {
    let opts = args.options()?;
    let mode = DriverMode::from(args.driver_type);

    if args.dry_run {
        driver::validate(&opts, mode)?;
        print_dry_run(&opts, mode);
        return Ok(());
    }

    let mut ctx = InvocationContext::new();
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    // Ctrl-C → cancel the in-flight store call.
    {
        let token = ctx.token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    // Held until the snapshot is saved, so concurrent sibling invocations
    // never hand out the same ids or drop each other's records.
    let snapshot = SnapshotLock::acquire(&ctx, &args.metadata_state)
        .await
        .with_context(|| format!("locking metadata state {:?}", args.metadata_state))?;
    let store = snapshot
        .load()
        .with_context(|| format!("loading metadata state {:?}", snapshot.path()))?;

    let execution = match mode {
        DriverMode::RootDag => {
            let cluster = FileClusterConfig::new(&args.cluster_config);
            driver::root_dag(&ctx, &opts, &store, &cluster).await?
        }
        DriverMode::Container => driver::container(&ctx, &opts, &store).await?,
    };

    snapshot
        .save(&store)
        .with_context(|| format!("saving metadata state {:?}", snapshot.path()))?;
    drop(snapshot);
    write_outputs(&args, &execution)?;

    info!(execution_id = execution.id, "driver finished");
    Ok(())
}

/// Write the execution id, context id and executor input where requested.
fn write_outputs(args: &CliArgs, execution: &Execution) -> Result<()> {
    if let Some(path) = &args.execution_id_path {
        write_file(path, &execution.id.to_string())?;
    }
    if let (Some(path), Some(context)) = (&args.context_id_path, execution.context) {
        write_file(path, &context.to_string())?;
    }
    if let (Some(path), Some(input)) = (&args.executor_input_path, &execution.executor_input) {
        let json = serde_json::to_string_pretty(input)?;
        write_file(path, &json)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("writing file {:?}", path))?;
    debug!(?path, "wrote driver output");
    Ok(())
}

/// Simple dry-run output: print what the driver would run with.
fn print_dry_run(opts: &Options, mode: DriverMode) {
    println!("pipeline-driver dry-run");
    println!("  mode = {mode}");
    println!("  {}", opts.info());

    if let Some(task) = &opts.task {
        println!("inputs of task {:?}:", task.name());
        for (name, spec) in &task.inputs.parameters {
            println!("  - parameter {name}: {spec}");
        }
        for (name, spec) in &task.inputs.artifacts {
            println!("  - artifact {name}: {spec}");
        }
    }
    if let Some(component) = &opts.component {
        let outputs: Vec<_> = component.output_definitions.artifacts.keys().collect();
        if !outputs.is_empty() {
            println!("output artifacts: {outputs:?}");
        }
    }

    debug!("dry-run complete (no store access)");
}
