//! Error types for the scheduler

use blockpar_primitives::{Gas, TxIndex};
use blockpar_types::TypesError;
use thiserror::Error;

/// A broken internal invariant.
///
/// These never stem from user input; they mean the graph or the scheduler
/// itself is wrong, so the analysis of the block is aborted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Node stored at a position that differs from its transaction index
    #[error("node at position {position} holds transaction {index}")]
    NodeIndexMismatch {
        /// Position in the arena
        position: usize,
        /// Transaction index of the node
        index: TxIndex,
    },

    /// Edge pointing to the same or an earlier transaction
    #[error("edge {from} -> {to} does not follow block order")]
    BackwardEdge {
        /// Source node
        from: TxIndex,
        /// Destination node
        to: TxIndex,
    },

    /// Edge without its matching parent link (or the reverse)
    #[error("edge {from} -> {to} is not mirrored by a parent link")]
    AsymmetricEdge {
        /// Source node
        from: TxIndex,
        /// Destination node
        to: TxIndex,
    },

    /// Edge referencing a node outside the graph
    #[error("edge {from} -> {to} references a missing node")]
    DanglingEdge {
        /// Source node
        from: TxIndex,
        /// Destination node
        to: TxIndex,
    },

    /// Job index outside the graph
    #[error("job {job} does not exist ({jobs} jobs)")]
    JobOutOfRange {
        /// Requested job
        job: TxIndex,
        /// Number of jobs
        jobs: usize,
    },

    /// Job assigned twice
    #[error("job {0} already assigned")]
    AlreadyAssigned(TxIndex),

    /// Lane index outside the schedule
    #[error("lane {lane} does not exist ({lanes} lanes)")]
    LaneOutOfRange {
        /// Requested lane
        lane: usize,
        /// Number of lanes
        lanes: usize,
    },

    /// Job started on a lane before the lane became free
    #[error("lane {lane} is busy until {free_at}, cannot start at {start}")]
    LaneBusy {
        /// Lane index
        lane: usize,
        /// Time the lane becomes free
        free_at: Gas,
        /// Requested start
        start: Gas,
    },

    /// Job started before all of its parents finished
    #[error("job {job} cannot start at {start}: dependencies unfinished")]
    DependenciesUnfinished {
        /// Job index
        job: TxIndex,
        /// Requested start
        start: Gas,
    },

    /// Job handed to the scheduler while not available
    #[error("job {0} is not available")]
    NotAvailable(TxIndex),

    /// No lane free at a keyframe that was produced by a lane becoming free
    #[error("no lane free at keyframe {time}")]
    NoFreeLane {
        /// Keyframe time
        time: Gas,
    },
}

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Zero lanes requested
    #[error("lane count must be positive, got {0}")]
    InvalidLaneCount(usize),

    /// No lane count to simulate
    #[error("at least one lane count is required")]
    NoLaneCounts,

    /// Block trace rejected before analysis
    #[error("invalid block trace: {0}")]
    InvalidTrace(#[from] TypesError),

    /// Broken internal invariant
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Keyframes exhausted with jobs left
    #[error("schedule incomplete: {} of {total} jobs never scheduled: {unscheduled:?}", unscheduled.len())]
    Incomplete {
        /// Jobs that never became available
        unscheduled: Vec<TxIndex>,
        /// Total number of jobs
        total: usize,
    },
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchedulerError::InvalidLaneCount(0);
        assert!(err.to_string().contains("positive"));

        let err = SchedulerError::from(InvariantViolation::AlreadyAssigned(7));
        assert!(err.to_string().contains("already assigned"));
        assert!(err.to_string().contains('7'));

        let err = SchedulerError::Incomplete {
            unscheduled: vec![3, 4],
            total: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 of 5"));
        assert!(msg.contains("[3, 4]"));
    }

    #[test]
    fn test_trace_error_conversion() {
        let err: SchedulerError = TypesError::IndexMismatch {
            position: 0,
            declared: 1,
        }
        .into();
        assert!(matches!(err, SchedulerError::InvalidTrace(_)));
    }
}
