//! End-to-end analysis of one block
//!
//! Chains the phases (build, reduce, critical path, one lane schedule per
//! configured lane count) and assembles a serializable report.

use crate::conflict::ConflictCounts;
use crate::critical_path::{level_of_parallelization, CriticalPath};
use crate::error::{SchedulerError, SchedulerResult};
use crate::footprint::ConflictPolicy;
use crate::graph::GraphBuilder;
use crate::reduction::reduce;
use crate::schedule::ScheduleResult;
use crate::scheduler::LaneScheduler;
use crate::stats::{percentage_of_serial, speedup};
use blockpar_metrics::{names, timed, Metrics};
use blockpar_primitives::{BlockNumber, Gas, H256};
use blockpar_types::BlockTrace;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span};

/// Default lane counts simulated per block
pub const DEFAULT_LANE_COUNTS: [usize; 4] = [2, 4, 8, 16];

/// What to compute for every block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Lane counts to simulate, each positive
    pub lane_counts: Vec<usize>,
    /// Conflict detection policy
    pub policy: ConflictPolicy,
    /// Keep the per-lane timeline of every schedule in the report
    pub include_timeline: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lane_counts: DEFAULT_LANE_COUNTS.to_vec(),
            policy: ConflictPolicy::default(),
            include_timeline: false,
        }
    }
}

impl AnalysisConfig {
    /// Reject lane counts the scheduler cannot run, and an empty list
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.lane_counts.is_empty() {
            return Err(SchedulerError::NoLaneCounts);
        }
        match self.lane_counts.iter().find(|&&lanes| lanes == 0) {
            Some(&lanes) => Err(SchedulerError::InvalidLaneCount(lanes)),
            None => Ok(()),
        }
    }
}

/// Outcome of scheduling a block on one lane count
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LaneReport {
    /// Number of lanes
    pub lanes: usize,
    /// Completion time
    pub makespan: Gas,
    /// Makespan as a percentage of the serial cost
    pub improvement: f64,
    /// Serial cost divided by makespan
    pub speedup: f64,
    /// Fraction of lane time spent running jobs
    pub utilization: f64,
    /// Per-lane assignments, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<ScheduleResult>,
}

/// Parallelism analysis of one block
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockReport {
    /// Block number
    pub block: BlockNumber,
    /// Block hash
    pub hash: H256,
    /// Gas used as declared by the block
    pub gas_used: Gas,
    /// Sum of transaction costs (fully serial execution time)
    pub serial_cost: Gas,
    /// Number of transactions
    pub tx_count: usize,
    /// Conflict edges before reduction
    pub edges: usize,
    /// Conflict edges after reduction
    pub reduced_edges: usize,
    /// Edges per conflict rule, before reduction
    pub conflicts: ConflictCounts,
    /// Number of transactions that wait for nothing
    pub level_of_parallelization: usize,
    /// Completion time with unlimited lanes
    pub critical_path: Gas,
    /// Critical path as a percentage of the serial cost
    pub critical_path_improvement: f64,
    /// One entry per simulated lane count
    pub schedules: Vec<LaneReport>,
}

impl BlockReport {
    /// Report for a lane count, if it was simulated
    pub fn schedule(&self, lanes: usize) -> Option<&LaneReport> {
        self.schedules.iter().find(|s| s.lanes == lanes)
    }
}

/// Runs the full pipeline on blocks.
///
/// Holds no per-block state, so one analyzer can serve many blocks from
/// many threads.
#[derive(Clone, Debug, Default)]
pub struct BlockAnalyzer {
    config: AnalysisConfig,
    metrics: Option<Arc<Metrics>>,
}

impl BlockAnalyzer {
    /// Create an analyzer
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Record phase timings and counters into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Current configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn phase<T>(&self, name: &str, run: impl FnOnce() -> T) -> T {
        match &self.metrics {
            Some(metrics) => timed!(metrics, name, { run() }),
            None => run(),
        }
    }

    /// Analyze one block
    pub fn analyze(&self, block: &BlockTrace) -> SchedulerResult<BlockReport> {
        let _span = info_span!("analyze", block = block.block).entered();
        let started = Instant::now();

        self.config.validate()?;
        block.validate()?;

        let mut builder = GraphBuilder::new(self.config.policy.clone());
        let graph = self.phase(names::BUILD_US, || builder.build(&block.txs))?;
        let reduced = self.phase(names::REDUCE_US, || reduce(&graph));

        let serial_cost = block.total_tx_gas();
        let critical_path = self.phase(names::CRITICAL_PATH_US, || {
            CriticalPath::new(&reduced).longest()
        });

        let scheduler = LaneScheduler::new(&reduced);
        let mut schedules = Vec::with_capacity(self.config.lane_counts.len());
        for &lanes in &self.config.lane_counts {
            let result = self.phase(names::SCHEDULE_US, || scheduler.run(lanes))?;
            debug!(lanes, makespan = result.makespan, "Lane schedule complete");
            schedules.push(LaneReport {
                lanes,
                makespan: result.makespan,
                improvement: percentage_of_serial(serial_cost, result.makespan),
                speedup: speedup(serial_cost, result.makespan),
                utilization: result.utilization(),
                timeline: self.config.include_timeline.then_some(result),
            });
        }

        let report = BlockReport {
            block: block.block,
            hash: block.hash,
            gas_used: block.gas_used,
            serial_cost,
            tx_count: block.len(),
            edges: graph.edge_count(),
            reduced_edges: reduced.edge_count(),
            conflicts: builder.counts(),
            level_of_parallelization: level_of_parallelization(&reduced),
            critical_path,
            critical_path_improvement: percentage_of_serial(serial_cost, critical_path),
            schedules,
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe(names::BLOCK_US, started.elapsed().as_micros() as u64);
            metrics.increment(names::TXS_ANALYZED, report.tx_count as u64);
            metrics.increment(names::EDGES_BUILT, report.edges as u64);
            metrics.increment(names::EDGES_KEPT, report.reduced_edges as u64);
        }

        debug!(
            txs = report.tx_count,
            edges = report.edges,
            reduced_edges = report.reduced_edges,
            critical_path = report.critical_path,
            "Block analyzed"
        );
        Ok(report)
    }
}
