use rustc_hash::FxHashSet;
use tracing::debug;

use super::{
    job::JobSpec,
    report::{JobStats, SimReport},
};
use crate::{
    core::{Time, driver::SimCore},
    error::SimError,
    scheduler::{PolicyKind, policy_for},
};

/// Largest arrival or duration a job may have.
pub const MAX_JOB_TIME: Time = 1e3;

/// Run `jobs` to completion under `kind` and collect the results.
///
/// The job list is checked up front: it must be non-empty, ids must be
/// unique, arrivals in `[0, MAX_JOB_TIME]` and durations in
/// `(0, MAX_JOB_TIME]`. Any failure aborts the run; there is no partial
/// report.
///
/// Round-Robin advances at most one quantum per step, even while the
/// processor idles, so its step count grows with the latest arrival and the
/// total work divided by `ROUND_ROBIN_QUANTUM`.
pub fn simulate(jobs: &[JobSpec], kind: PolicyKind) -> Result<SimReport, SimError> {
    validate(jobs)?;

    debug!(policy = %kind, jobs = jobs.len(), "starting simulation");
    let mut core = SimCore::new(policy_for(kind));
    for job in jobs {
        core.add_job(job.id, job.arrival, job.duration);
    }
    core.run()?;

    let stats = core
        .jobs()
        .map(JobStats::from_job)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SimReport::new(kind, core.now(), stats, core.take_timeline()))
}

pub fn validate(jobs: &[JobSpec]) -> Result<(), SimError> {
    if jobs.is_empty() {
        return Err(SimError::EmptyJobSet);
    }

    let mut seen = FxHashSet::default();
    for job in jobs {
        if !seen.insert(job.id) {
            return Err(SimError::DuplicateJobId(job.id));
        }
        if !(0.0..=MAX_JOB_TIME).contains(&job.arrival) {
            return Err(SimError::InvalidArrival {
                job_id: job.id,
                arrival: job.arrival,
            });
        }
        if !(job.duration > 0.0 && job.duration <= MAX_JOB_TIME) {
            return Err(SimError::InvalidDuration {
                job_id: job.id,
                duration: job.duration,
            });
        }
    }

    Ok(())
}
