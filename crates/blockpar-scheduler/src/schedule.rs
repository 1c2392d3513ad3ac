//! Lane schedule state and its frozen result

use crate::error::InvariantViolation;
use crate::graph::Graph;
use blockpar_primitives::{Gas, TxIndex};
use serde::Serialize;

/// One job placed on a lane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Transaction index
    pub job: TxIndex,
    /// Lane the job runs on
    pub lane: usize,
    /// Start time
    pub start: Gas,
    /// Execution cost
    pub duration: Gas,
}

impl Assignment {
    /// Time the job completes, saturating at `Gas::MAX`
    pub fn finish_time(&self) -> Gas {
        self.start.saturating_add(self.duration)
    }
}

/// Jobs placed on a single lane, in start order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LaneSchedule {
    /// Lane index
    pub lane: usize,
    /// Jobs run on this lane
    pub assignments: Vec<Assignment>,
    #[serde(skip)]
    free_at: Gas,
}

impl LaneSchedule {
    /// Create an idle lane
    pub fn new(lane: usize) -> Self {
        Self {
            lane,
            assignments: Vec::new(),
            free_at: 0,
        }
    }

    /// Time the lane becomes free
    pub fn free_at(&self) -> Gas {
        self.free_at
    }

    /// Total time spent running jobs
    pub fn busy_time(&self) -> Gas {
        self.assignments
            .iter()
            .map(|a| a.duration)
            .fold(0, Gas::saturating_add)
    }

    fn assign(
        &mut self,
        job: TxIndex,
        start: Gas,
        duration: Gas,
    ) -> Result<Assignment, InvariantViolation> {
        if start < self.free_at {
            return Err(InvariantViolation::LaneBusy {
                lane: self.lane,
                free_at: self.free_at,
                start,
            });
        }

        let assignment = Assignment {
            job,
            lane: self.lane,
            start,
            duration,
        };
        self.assignments.push(assignment);
        self.free_at = assignment.finish_time();
        Ok(assignment)
    }
}

/// Schedule under construction for one graph and a fixed lane count.
///
/// Every job is assigned at most once, only through [`Schedule::assign`],
/// which rejects any placement breaking lane or dependency order.
#[derive(Debug)]
pub struct Schedule<'g> {
    graph: &'g Graph,
    lanes: Vec<LaneSchedule>,
    job_assignments: Vec<Option<Assignment>>,
    makespan: Gas,
}

impl<'g> Schedule<'g> {
    /// Create an empty schedule with `lane_count` idle lanes
    pub fn new(graph: &'g Graph, lane_count: usize) -> Self {
        Self {
            graph,
            lanes: (0..lane_count).map(LaneSchedule::new).collect(),
            job_assignments: vec![None; graph.len()],
            makespan: 0,
        }
    }

    /// Number of lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Lane state
    pub fn lane(&self, lane: usize) -> Option<&LaneSchedule> {
        self.lanes.get(lane)
    }

    /// Latest finish time so far
    pub fn makespan(&self) -> Gas {
        self.makespan
    }

    /// Assignment of a job, if placed
    pub fn assignment(&self, job: TxIndex) -> Option<&Assignment> {
        self.job_assignments.get(job).and_then(Option::as_ref)
    }

    fn dependencies_finished_at(&self, job: TxIndex, time: Gas) -> bool {
        self.graph.nodes()[job].parents().iter().all(|&parent| {
            self.job_assignments[parent].is_some_and(|a| a.finish_time() <= time)
        })
    }

    /// Place `job` on `lane` starting at `start`
    pub fn assign(
        &mut self,
        job: TxIndex,
        lane: usize,
        start: Gas,
    ) -> Result<Assignment, InvariantViolation> {
        let jobs = self.graph.len();
        if job >= jobs {
            return Err(InvariantViolation::JobOutOfRange { job, jobs });
        }
        if self.job_assignments[job].is_some() {
            return Err(InvariantViolation::AlreadyAssigned(job));
        }
        let lanes = self.lanes.len();
        if lane >= lanes {
            return Err(InvariantViolation::LaneOutOfRange { lane, lanes });
        }
        if !self.dependencies_finished_at(job, start) {
            return Err(InvariantViolation::DependenciesUnfinished { job, start });
        }

        let duration = self.graph.nodes()[job].cost();
        let assignment = self.lanes[lane].assign(job, start, duration)?;
        self.job_assignments[job] = Some(assignment);
        self.makespan = self.makespan.max(assignment.finish_time());
        Ok(assignment)
    }

    /// Lowest-index lane free at or before `time`
    pub fn free_lane_at(&self, time: Gas) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.free_at <= time)
    }

    /// Jobs not yet placed, in index order
    pub fn unassigned(&self) -> Vec<TxIndex> {
        self.job_assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_none())
            .map(|(job, _)| job)
            .collect()
    }

    /// Freeze the schedule
    pub fn result(self) -> ScheduleResult {
        ScheduleResult {
            lane_count: self.lanes.len(),
            makespan: self.makespan,
            lanes: self.lanes,
        }
    }
}

/// Completed schedule for one lane count
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    /// Number of lanes
    pub lane_count: usize,
    /// Latest finish time over all jobs
    pub makespan: Gas,
    /// Per-lane timelines
    pub lanes: Vec<LaneSchedule>,
}

impl ScheduleResult {
    /// Sum of job durations over all lanes, saturating at `Gas::MAX`
    pub fn busy_time(&self) -> Gas {
        self.lanes
            .iter()
            .map(LaneSchedule::busy_time)
            .fold(0, Gas::saturating_add)
    }

    /// Number of placed jobs
    pub fn job_count(&self) -> usize {
        self.lanes.iter().map(|l| l.assignments.len()).sum()
    }

    /// Iterate all assignments, lane by lane
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> + '_ {
        self.lanes.iter().flat_map(|l| l.assignments.iter())
    }

    /// Fraction of lane time spent running jobs (0.0 for an empty schedule)
    pub fn utilization(&self) -> f64 {
        let capacity = self.lane_count as u128 * self.makespan as u128;
        if capacity == 0 {
            return 0.0;
        }
        self.busy_time() as f64 / capacity as f64
    }
}
