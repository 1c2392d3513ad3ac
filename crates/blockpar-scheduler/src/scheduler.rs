//! Greedy list scheduling onto a fixed number of lanes
//!
//! A discrete-event simulation: time advances through keyframes (the
//! moments a lane becomes free), and at each keyframe the available job
//! with the longest critical path is placed on a free lane, repeated until
//! no job or no lane is left for that instant.

use crate::critical_path::CriticalPath;
use crate::error::{InvariantViolation, SchedulerError, SchedulerResult};
use crate::graph::Graph;
use crate::schedule::{Schedule, ScheduleResult};
use crate::tracker::DependencyTracker;
use blockpar_primitives::Gas;
use std::collections::BTreeSet;
use tracing::{debug, error, trace};

/// Schedules one graph for any number of lane counts.
///
/// Critical-path priorities are computed once and reused by every run.
#[derive(Debug)]
pub struct LaneScheduler<'g> {
    graph: &'g Graph,
    priorities: Vec<Gas>,
}

impl<'g> LaneScheduler<'g> {
    /// Create a scheduler for `graph`
    pub fn new(graph: &'g Graph) -> Self {
        let priorities = CriticalPath::new(graph).all();
        Self { graph, priorities }
    }

    /// Critical-path priority of every job
    pub fn priorities(&self) -> &[Gas] {
        &self.priorities
    }

    /// Simulate scheduling on `lane_count` lanes
    pub fn run(&self, lane_count: usize) -> SchedulerResult<ScheduleResult> {
        if lane_count == 0 {
            return Err(SchedulerError::InvalidLaneCount(lane_count));
        }

        let mut schedule = Schedule::new(self.graph, lane_count);
        let mut tracker = DependencyTracker::new(self.graph, self.priorities.clone());
        let mut keyframes = BTreeSet::from([0]);

        while !tracker.is_finished() {
            let Some(time) = keyframes.pop_first() else {
                break;
            };

            let mut lane = Some(
                schedule
                    .free_lane_at(time)
                    .ok_or(InvariantViolation::NoFreeLane { time })?,
            );

            while let Some(free) = lane {
                let Some(job) = tracker.next_ready(time) else {
                    break;
                };
                let assignment = schedule.assign(job, free, time)?;
                tracker.register_assigned(job, time)?;
                trace!(job, lane = free, start = time, "Assigned job");
                // a zero-cost job leaves its lane free at `time`, which is being handled now
                if assignment.finish_time() > time {
                    keyframes.insert(assignment.finish_time());
                }
                lane = schedule.free_lane_at(time);
            }
        }

        if !tracker.is_finished() {
            let unscheduled = schedule.unassigned();
            error!(?unscheduled, "Keyframes exhausted before every job was scheduled");
            return Err(SchedulerError::Incomplete {
                unscheduled,
                total: self.graph.len(),
            });
        }

        let result = schedule.result();
        debug!(
            lanes = lane_count,
            jobs = self.graph.len(),
            makespan = result.makespan,
            "Scheduled block"
        );
        Ok(result)
    }
}

/// Schedule `graph` on `lane_count` lanes
pub fn schedule(graph: &Graph, lane_count: usize) -> SchedulerResult<ScheduleResult> {
    LaneScheduler::new(graph).run(lane_count)
}
