//! Readiness tracking for the lane scheduler

use crate::error::InvariantViolation;
use crate::graph::Graph;
use blockpar_primitives::{Gas, TxIndex};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Lifecycle of a job during scheduling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Waiting for parents, or for the time its parents finish
    Blocked,
    /// All parents finished by the current time
    Available,
    /// Placed on a lane
    Assigned,
}

/// Available job ordered by priority, then by lowest index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReadyJob {
    priority: Gas,
    job: TxIndex,
}

impl Ord for ReadyJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.job.cmp(&self.job))
    }
}

impl PartialOrd for ReadyJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Tracks unfinished parents and earliest start of every job.
///
/// A job whose parents are all assigned waits in a time-ordered queue until
/// the simulation reaches its earliest start; it then joins the ready heap
/// keyed by its priority.
#[derive(Debug)]
pub struct DependencyTracker<'g> {
    graph: &'g Graph,
    priorities: Vec<Gas>,
    remaining_parents: Vec<usize>,
    earliest_start: Vec<Gas>,
    states: Vec<JobState>,
    pending: BinaryHeap<Reverse<(Gas, TxIndex)>>,
    ready: BinaryHeap<ReadyJob>,
    assigned: usize,
}

impl<'g> DependencyTracker<'g> {
    /// Create a tracker; `priorities` holds one value per job
    pub fn new(graph: &'g Graph, priorities: Vec<Gas>) -> Self {
        let remaining_parents: Vec<usize> =
            graph.nodes().iter().map(|n| n.parents().len()).collect();
        let pending = remaining_parents
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(job, _)| Reverse((0, job)))
            .collect();

        Self {
            graph,
            priorities,
            remaining_parents,
            earliest_start: vec![0; graph.len()],
            states: vec![JobState::Blocked; graph.len()],
            pending,
            ready: BinaryHeap::new(),
            assigned: 0,
        }
    }

    /// State of a job
    pub fn state(&self, job: TxIndex) -> Option<JobState> {
        self.states.get(job).copied()
    }

    /// Earliest start recorded for a job
    pub fn earliest_start(&self, job: TxIndex) -> Option<Gas> {
        self.earliest_start.get(job).copied()
    }

    fn release_until(&mut self, time: Gas) {
        while let Some(&Reverse((earliest, job))) = self.pending.peek() {
            if earliest > time {
                break;
            }
            self.pending.pop();
            self.states[job] = JobState::Available;
            self.ready.push(ReadyJob {
                priority: self.priorities.get(job).copied().unwrap_or_default(),
                job,
            });
        }
    }

    /// Take the highest-priority job available at `time`
    pub fn next_ready(&mut self, time: Gas) -> Option<TxIndex> {
        self.release_until(time);
        self.ready.pop().map(|ready| ready.job)
    }

    /// Record `job` as started at `start`, unblocking its children
    pub fn register_assigned(&mut self, job: TxIndex, start: Gas) -> Result<(), InvariantViolation> {
        if self.states.get(job) != Some(&JobState::Available) {
            return Err(InvariantViolation::NotAvailable(job));
        }
        if self.earliest_start[job] > start {
            return Err(InvariantViolation::DependenciesUnfinished { job, start });
        }

        self.states[job] = JobState::Assigned;
        self.assigned += 1;

        let node = &self.graph.nodes()[job];
        let finish = start.saturating_add(node.cost());
        for &child in node.edges() {
            self.earliest_start[child] = self.earliest_start[child].max(finish);
            self.remaining_parents[child] -= 1;
            if self.remaining_parents[child] == 0 {
                self.pending.push(Reverse((self.earliest_start[child], child)));
            }
        }
        Ok(())
    }

    /// Number of assigned jobs
    pub fn assigned(&self) -> usize {
        self.assigned
    }

    /// Check if every job has been assigned
    pub fn is_finished(&self) -> bool {
        self.assigned == self.graph.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use blockpar_primitives::Address;
    use blockpar_types::TxTrace;

    fn addr(id: u8) -> Address {
        Address::from_bytes([id; 20])
    }

    #[test]
    fn test_roots_available_at_zero() {
        let graph = GraphBuilder::default()
            .build(&[TxTrace::new(0, 10), TxTrace::new(1, 20)])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![10, 20]);

        // highest priority first
        assert_eq!(tracker.next_ready(0), Some(1));
        assert_eq!(tracker.next_ready(0), Some(0));
        assert_eq!(tracker.next_ready(0), None);
    }

    #[test]
    fn test_ties_pick_lowest_index() {
        let graph = GraphBuilder::default()
            .build(&[TxTrace::new(0, 5), TxTrace::new(1, 5), TxTrace::new(2, 5)])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![5, 5, 5]);

        assert_eq!(tracker.next_ready(0), Some(0));
        assert_eq!(tracker.next_ready(0), Some(1));
        assert_eq!(tracker.next_ready(0), Some(2));
    }

    #[test]
    fn test_child_waits_for_parent_finish() {
        let graph = GraphBuilder::default()
            .build(&[
                TxTrace::new(0, 100).writes(addr(1)),
                TxTrace::new(1, 200).reads(addr(1)),
            ])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![300, 200]);

        assert_eq!(tracker.state(1), Some(JobState::Blocked));
        assert_eq!(tracker.next_ready(0), Some(0));
        tracker.register_assigned(0, 0).unwrap();
        assert_eq!(tracker.state(0), Some(JobState::Assigned));

        assert_eq!(tracker.earliest_start(1), Some(100));
        assert_eq!(tracker.next_ready(99), None);
        assert_eq!(tracker.state(1), Some(JobState::Blocked));
        assert_eq!(tracker.next_ready(100), Some(1));
        assert_eq!(tracker.state(1), Some(JobState::Available));

        tracker.register_assigned(1, 100).unwrap();
        assert!(tracker.is_finished());
        assert_eq!(tracker.assigned(), 2);
    }

    #[test]
    fn test_earliest_start_is_latest_parent() {
        let graph = GraphBuilder::default()
            .build(&[
                TxTrace::new(0, 100).writes(addr(1)),
                TxTrace::new(1, 200).writes(addr(2)),
                TxTrace::new(2, 50).reads(addr(1)).reads(addr(2)),
            ])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![150, 250, 50]);

        assert_eq!(tracker.next_ready(0), Some(1));
        tracker.register_assigned(1, 0).unwrap();
        assert_eq!(tracker.next_ready(0), Some(0));
        tracker.register_assigned(0, 0).unwrap();

        assert_eq!(tracker.earliest_start(2), Some(200));
        assert_eq!(tracker.next_ready(150), None);
        assert_eq!(tracker.next_ready(200), Some(2));
    }

    #[test]
    fn test_earliest_start_saturates() {
        let graph = GraphBuilder::default()
            .build(&[
                TxTrace::new(0, Gas::MAX).writes(addr(1)),
                TxTrace::new(1, 1).reads(addr(1)),
            ])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![Gas::MAX, 1]);

        tracker.next_ready(0);
        tracker.register_assigned(0, 5).unwrap();
        assert_eq!(tracker.earliest_start(1), Some(Gas::MAX));
        assert_eq!(tracker.next_ready(Gas::MAX), Some(1));
    }

    #[test]
    fn test_register_rejects_unavailable_job() {
        let graph = GraphBuilder::default()
            .build(&[
                TxTrace::new(0, 100).writes(addr(1)),
                TxTrace::new(1, 200).reads(addr(1)),
            ])
            .unwrap();
        let mut tracker = DependencyTracker::new(&graph, vec![300, 200]);

        assert_eq!(
            tracker.register_assigned(1, 0),
            Err(InvariantViolation::NotAvailable(1))
        );
        assert_eq!(
            tracker.register_assigned(5, 0),
            Err(InvariantViolation::NotAvailable(5))
        );

        tracker.next_ready(0);
        tracker.register_assigned(0, 0).unwrap();
        assert_eq!(
            tracker.register_assigned(0, 0),
            Err(InvariantViolation::NotAvailable(0))
        );
    }
}
