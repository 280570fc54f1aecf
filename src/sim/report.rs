use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{
    core::{Job, JobId, Time, Timeline},
    error::SimError,
    scheduler::PolicyKind,
};

/// What one job went through during a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStats {
    pub id: JobId,
    pub arrival: Time,
    pub duration: Time,
    /// Processor time accumulated over the run; equals `duration` up to
    /// float error.
    pub elapsed_time: Time,
    pub response_time: Time,
    pub turnaround_time: Time,
    pub start_time: Time,
    pub end_time: Time,
    pub state_change_times: Vec<Time>,
}

impl JobStats {
    pub(crate) fn from_job(job: &Job) -> Result<Self, SimError> {
        let unfinished = || SimError::Unfinished { job_id: job.id };
        Ok(Self {
            id: job.id,
            arrival: job.arrival,
            duration: job.duration,
            elapsed_time: job.elapsed_time,
            response_time: job.response_time.ok_or_else(unfinished)?,
            turnaround_time: job.turnaround_time.ok_or_else(unfinished)?,
            start_time: job.start_time.ok_or_else(unfinished)?,
            end_time: job.end_time.ok_or_else(unfinished)?,
            state_change_times: job.state_change_times.clone(),
        })
    }

    /// Arrival, every dispatch and stop, then completion.
    pub fn state_changes(&self) -> Vec<Time> {
        let mut changes = Vec::with_capacity(self.state_change_times.len() + 2);
        changes.push(self.arrival);
        changes.extend_from_slice(&self.state_change_times);
        changes.push(self.end_time);
        changes
    }

    /// (start, stop) of every stretch on the processor. Empty when the
    /// policy does not record state changes.
    pub fn run_intervals(&self) -> Vec<(Time, Time)> {
        self.state_change_times
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    /// Time spent arrived but not running.
    pub fn wait_time(&self) -> Time {
        self.turnaround_time - self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateStats {
    pub average_response_time: Time,
    pub average_turnaround_time: Time,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub policy: PolicyKind,
    pub completion_time: Time,
    jobs: Vec<JobStats>,
    timeline: Timeline,
    #[serde(skip)]
    index: FxHashMap<JobId, usize>,
}

impl SimReport {
    pub(crate) fn new(
        policy: PolicyKind,
        completion_time: Time,
        jobs: Vec<JobStats>,
        timeline: Timeline,
    ) -> Self {
        let index = jobs
            .iter()
            .enumerate()
            .map(|(position, job)| (job.id, position))
            .collect();

        Self {
            policy,
            completion_time,
            jobs,
            timeline,
            index,
        }
    }

    /// Per-job statistics in input order.
    pub fn per_job_stats(&self) -> &[JobStats] {
        &self.jobs
    }

    pub fn job(&self, id: JobId) -> Option<&JobStats> {
        self.index.get(&id).map(|&position| &self.jobs[position])
    }

    /// Plain arithmetic means over every job.
    pub fn aggregate_stats(&self) -> Result<AggregateStats, SimError> {
        if self.jobs.is_empty() {
            return Err(SimError::EmptyJobSet);
        }

        let count = self.jobs.len() as f64;
        let total_response: Time = self.jobs.iter().map(|job| job.response_time).sum();
        let total_turnaround: Time = self.jobs.iter().map(|job| job.turnaround_time).sum();

        Ok(AggregateStats {
            average_response_time: total_response / count,
            average_turnaround_time: total_turnaround / count,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Every distinct instant at which some job arrived, started, stopped or
    /// finished, ascending.
    pub fn event_times(&self) -> Vec<Time> {
        let mut times: Vec<Time> = self.jobs.iter().flat_map(JobStats::state_changes).collect();
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        times
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(id: JobId, arrival: Time, duration: Time, response: Time, turnaround: Time) -> JobStats {
        JobStats {
            id,
            arrival,
            duration,
            elapsed_time: duration,
            response_time: response,
            turnaround_time: turnaround,
            start_time: arrival + response,
            end_time: arrival + turnaround,
            state_change_times: vec![arrival + response, arrival + turnaround],
        }
    }

    #[test]
    fn state_changes_bracket_the_run() {
        let job = stats(2, 1.0, 2.0, 4.0, 6.0);
        assert_eq!(job.state_changes(), vec![1.0, 5.0, 7.0, 7.0]);
        assert_eq!(job.run_intervals(), vec![(5.0, 7.0)]);
        assert_eq!(job.wait_time(), 4.0);
    }

    #[test]
    fn lookup_by_id_and_averages() {
        let report = SimReport::new(
            PolicyKind::Fifo,
            7.0,
            vec![stats(5, 0.0, 5.0, 0.0, 5.0), stats(9, 1.0, 2.0, 4.0, 6.0)],
            Timeline::new(),
        );

        assert_eq!(report.job(9).map(|job| job.arrival), Some(1.0));
        assert!(report.job(0).is_none());

        let aggregate = report.aggregate_stats().unwrap();
        assert_eq!(aggregate.average_response_time, 2.0);
        assert_eq!(aggregate.average_turnaround_time, 5.5);
        assert_eq!(report.event_times(), vec![0.0, 1.0, 5.0, 7.0]);
    }

    #[test]
    fn empty_report_has_no_averages() {
        let report = SimReport::new(PolicyKind::Fifo, 0.0, Vec::new(), Timeline::new());
        assert_eq!(report.aggregate_stats(), Err(SimError::EmptyJobSet));
    }
}
