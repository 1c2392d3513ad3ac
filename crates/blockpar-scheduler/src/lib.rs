//! # blockpar-scheduler
//!
//! Estimates how much of a block could execute concurrently.
//!
//! Given each transaction's declared read/write footprint this crate:
//! - builds a conflict graph ordering every conflicting pair by block position
//! - reduces it to its transitive reduction
//! - computes critical paths (the unlimited-parallelism completion time)
//! - simulates greedy list scheduling onto a fixed number of lanes
//!
//! Everything here is a pure, single-threaded computation over one block;
//! lanes are simulated and nothing is executed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod conflict;
pub mod critical_path;
pub mod error;
pub mod footprint;
pub mod graph;
pub mod reduction;
pub mod schedule;
pub mod scheduler;
pub mod stats;
pub mod tracker;

pub use analysis::{AnalysisConfig, BlockAnalyzer, BlockReport, LaneReport, DEFAULT_LANE_COUNTS};
pub use conflict::{ConflictCounts, ConflictKind};
pub use critical_path::{highest_cost_path, level_of_parallelization, CriticalPath};
pub use error::{InvariantViolation, SchedulerError, SchedulerResult};
pub use footprint::{ConflictPolicy, Footprint};
pub use graph::{Graph, GraphBuilder, Node};
pub use reduction::reduce;
pub use schedule::{Assignment, LaneSchedule, Schedule, ScheduleResult};
pub use scheduler::{schedule, LaneScheduler};
pub use stats::{percentage_of_serial, speedup};
pub use tracker::{DependencyTracker, JobState};
