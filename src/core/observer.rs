use slotmap::SlotMap;

use super::state::{Job, JobKey, JobState, SCHEDULER_EPSILON};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    // Runs between steps, when no job should be on the processor
    pub fn observe(&mut self, jobs: &SlotMap<JobKey, Job>) {
        self.step += 1;

        for job in jobs.values() {
            let job_id = job.id;
            debug_assert_ne!(
                job.state(),
                JobState::Running,
                "Job {job_id} left running between steps"
            );
            debug_assert!(
                job.elapsed_time <= job.duration + SCHEDULER_EPSILON,
                "Job {job_id} ran {} past its duration {}",
                job.elapsed_time,
                job.duration
            );
            debug_assert_eq!(
                job.is_complete(),
                job.turnaround_time.is_some(),
                "Job {job_id} turnaround must be set exactly on completion"
            );
            debug_assert_eq!(
                job.elapsed_time > 0.0,
                job.has_started(),
                "Job {job_id} response time must be set exactly once dispatched"
            );
        }
    }
}
