//! Collect command - run collectors and write a bundle

use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use triage_collect::{
    CollectContext, CollectOutput, CollectRunner, KubeSecretSource, OciSignatureFetcher,
    ProgressSender, cancellation,
};
use triage_core::TriageConfig;
use triage_core::archive::{is_archive, write_archive};
use triage_loader::TroubleshootKinds;

use crate::display::CollectProgress;
use crate::error::{CliError, Result};

/// Top-level directory inside a written archive
const ARCHIVE_PREFIX: &str = "bundle";

pub fn run(
    files: &[PathBuf],
    output: &Path,
    strict: bool,
    concurrency: usize,
    host: bool,
    config: &TriageConfig,
) -> Result<()> {
    let kinds = super::load(files, strict)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::internal(format!("failed to start runtime: {}", e)))?;
    let collected = rt.block_on(collect(&kinds, concurrency, host, config))?;

    if collected.evidence.is_empty() {
        println!("{} Nothing was collected", style("⚠").yellow());
    } else if is_archive(output) {
        write_archive(&collected.evidence, ARCHIVE_PREFIX, output).map_err(|e| {
            CliError::Bundle {
                path: output.display().to_string(),
                source: e,
            }
        })?;
    } else {
        collected
            .evidence
            .write_to_dir(output)
            .map_err(|e| CliError::Bundle {
                path: output.display().to_string(),
                source: e,
            })?;
    }

    println!(
        "{} {} collector(s) wrote {} artifact(s) to {}",
        style("✓").green().bold(),
        collected.collected.len(),
        collected.evidence.len(),
        output.display()
    );

    for failure in &collected.failures {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            failure.collector,
            failure.message
        );
    }

    Ok(())
}

async fn collect(
    kinds: &TroubleshootKinds,
    concurrency: usize,
    host: bool,
    config: &TriageConfig,
) -> Result<CollectOutput> {
    let fetcher = Arc::new(OciSignatureFetcher::new(&config.registry));
    let mut runner = CollectRunner::new(fetcher).with_host_collectors(host);

    match KubeSecretSource::new().await {
        Ok(source) => runner = runner.with_secrets(Arc::new(source)),
        Err(e) => debug!(error = %e, "no Kubernetes client, pull secrets by name are unavailable"),
    }

    let (tx, mut rx) = mpsc::channel(64);
    let (handle, token) = cancellation();
    let ctx = CollectContext::default()
        .with_concurrency(concurrency)
        .with_progress(ProgressSender::new(tx))
        .with_cancel(token);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let progress = CollectProgress::new();
    let reporter = async {
        while let Some(event) = rx.recv().await {
            progress.handle(event);
        }
    };

    let run = async {
        let result = runner.run(kinds, &ctx).await;
        // closes the progress channel so the reporter drains and stops
        drop(ctx);
        result
    };

    let (result, ()) = tokio::join!(run, reporter);
    progress.finish();

    Ok(result?)
}
