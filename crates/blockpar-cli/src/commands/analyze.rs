//! Analyze a single block file

use crate::{output::Output, CliError};
use blockpar_scheduler::{BlockAnalyzer, BlockReport};
use blockpar_types::BlockTrace;
use std::path::Path;
use tracing::info;

/// Read and decode a block trace file
pub fn load_block(path: &Path) -> Result<BlockTrace, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::from(e).in_file(path))?;
    serde_json::from_str(&content).map_err(|e| CliError::from(e).in_file(path))
}

/// Analyze the block stored at `path`
pub fn analyze_file(analyzer: &BlockAnalyzer, path: &Path) -> Result<BlockReport, CliError> {
    let block = load_block(path)?;
    analyzer
        .analyze(&block)
        .map_err(|e| CliError::from(e).in_file(path))
}

/// Run `blockpar analyze`
pub fn execute(analyzer: &BlockAnalyzer, path: &Path, json: bool) -> Result<(), CliError> {
    let report = analyze_file(analyzer, path)?;
    info!(block = report.block, txs = report.tx_count, "Analyzed block");
    render(&report, json).print();
    Ok(())
}

/// Format a report for the terminal
pub fn render(report: &BlockReport, json: bool) -> Output {
    let mut out = Output::new(json)
        .fields_of(report)
        .line(format!("Block {} ({})", report.block, report.hash))
        .line(format!(
            "Transactions: {}   serial cost: {}   declared gas: {}",
            report.tx_count, report.serial_cost, report.gas_used
        ))
        .line(format!(
            "Conflict edges: {} ({} after reduction)",
            report.edges, report.reduced_edges
        ))
        .line(format!(
            "Level of parallelization: {}",
            report.level_of_parallelization
        ))
        .line(format!(
            "Critical path: {} ({:.2}% of serial)",
            report.critical_path, report.critical_path_improvement
        ));

    for lane in &report.schedules {
        out = out.line(format!(
            "  {:>3} lanes: makespan {:>12}  {:>6.2}% of serial  speedup {:.2}x  utilization {:.1}%",
            lane.lanes,
            lane.makespan,
            lane.improvement,
            lane.speedup,
            lane.utilization * 100.0
        ));
        if let Some(timeline) = &lane.timeline {
            for schedule in &timeline.lanes {
                let jobs: Vec<String> = schedule
                    .assignments
                    .iter()
                    .map(|a| format!("{}@{}", a.job, a.start))
                    .collect();
                out = out.line(format!("      lane {}: {}", schedule.lane, jobs.join(" ")));
            }
        }
    }
    out
}
