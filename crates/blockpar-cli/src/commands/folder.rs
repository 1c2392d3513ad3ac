//! Analyze every block file of a directory

use crate::commands::analyze::analyze_file;
use crate::{output::Output, CliError};
use blockpar_metrics::{names, Metrics};
use blockpar_scheduler::BlockAnalyzer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Suffix of the files written next to each analyzed block
pub const RESULT_SUFFIX: &str = "-result.json";

/// Outcome of a folder run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    /// Result files written
    pub written: Vec<PathBuf>,
    /// Files that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Block files in `dir`, sorted by name, skipping earlier results
pub fn block_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".json") && !name.ends_with(RESULT_SUFFIX) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Path of the result file for a block file: `<stem>-result.json`
pub fn result_path(block_file: &Path) -> PathBuf {
    let stem = block_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    block_file.with_file_name(format!("{stem}{RESULT_SUFFIX}"))
}

fn process_file(analyzer: &BlockAnalyzer, path: &Path) -> Result<PathBuf, CliError> {
    let report = analyze_file(analyzer, path)?;
    let out = result_path(path);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&out, json).map_err(|e| CliError::from(e).in_file(&out))?;
    Ok(out)
}

/// Analyze every block file of `dir` with at most `jobs` files in flight
pub async fn run(
    analyzer: Arc<BlockAnalyzer>,
    dir: &Path,
    jobs: usize,
    metrics: Arc<Metrics>,
) -> Result<FolderSummary, CliError> {
    let files = block_files(dir)?;
    info!(files = files.len(), jobs, dir = %dir.display(), "Analyzing folder");

    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();
    for path in files {
        let analyzer = Arc::clone(&analyzer);
        let permits = Arc::clone(&permits);
        let metrics = Arc::clone(&metrics);
        tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (path, Err(CliError::Worker(e.to_string()))),
            };
            metrics.add_gauge(names::BLOCKS_IN_FLIGHT, 1);
            let worker_path = path.clone();
            let outcome =
                tokio::task::spawn_blocking(move || process_file(&analyzer, &worker_path)).await;
            metrics.add_gauge(names::BLOCKS_IN_FLIGHT, -1);

            let outcome = match outcome {
                Ok(result) => result,
                Err(e) => Err(CliError::Worker(e.to_string())),
            };
            (path, outcome)
        });
    }

    let mut summary = FolderSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (path, outcome) = joined.map_err(|e| CliError::Worker(e.to_string()))?;
        match outcome {
            Ok(written) => {
                metrics.increment(names::BLOCKS_ANALYZED, 1);
                info!(result = %written.display(), "Wrote result");
                summary.written.push(written);
            }
            Err(e) => {
                metrics.increment(names::BLOCKS_FAILED, 1);
                warn!(file = %path.display(), error = %e, "Block failed");
                summary.failed.push((path, e.to_string()));
            }
        }
    }
    summary.written.sort();
    summary.failed.sort();
    Ok(summary)
}

/// Run `blockpar folder`
pub async fn execute(
    analyzer: BlockAnalyzer,
    dir: &Path,
    jobs: usize,
    show_metrics: bool,
    json: bool,
) -> Result<(), CliError> {
    let metrics = Arc::new(Metrics::new());
    let analyzer = Arc::new(analyzer.with_metrics(Arc::clone(&metrics)));
    let summary = run(analyzer, dir, jobs, Arc::clone(&metrics)).await?;

    let total = summary.written.len() + summary.failed.len();
    let failures: Vec<_> = summary
        .failed
        .iter()
        .map(|(path, reason)| serde_json::json!({ "file": path, "error": reason }))
        .collect();

    let mut out = Output::new(json)
        .field_u64("analyzed", summary.written.len() as u64)
        .field_u64("failed", summary.failed.len() as u64)
        .field_value("failures", &failures)
        .line(format!(
            "Analyzed {} of {} block files in {}",
            summary.written.len(),
            total,
            dir.display()
        ));
    for (path, reason) in &summary.failed {
        out = out.line(format!("  failed {}: {}", path.display(), reason));
    }

    if show_metrics {
        let snapshot = metrics.snapshot();
        snapshot.log();
        out = out.field_value("metrics", &snapshot);
        if !json {
            out = out.line(snapshot.to_json()?);
        }
    }
    out.print();

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::FolderFailed {
            failed: summary.failed.len(),
            total,
        })
    }
}
