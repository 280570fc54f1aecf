use crate::{
    core::{JobId, Time},
    sim::MAX_JOB_TIME,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("job set is empty; at least one job is required")]
    EmptyJobSet,
    #[error(
        "job {job_id} has invalid duration {duration}; durations must be positive and at most {max}",
        max = MAX_JOB_TIME
    )]
    InvalidDuration { job_id: JobId, duration: Time },
    #[error(
        "job {job_id} has invalid arrival time {arrival}; arrivals must lie in [0, {max}]",
        max = MAX_JOB_TIME
    )]
    InvalidArrival { job_id: JobId, arrival: Time },
    #[error("job id {0} appears more than once")]
    DuplicateJobId(JobId),
    #[error("invalid job generator config: {0}")]
    InvalidConfig(String),
    #[error("unknown scheduling policy {0:?}")]
    UnknownPolicy(String),
    #[error("simulation stalled at t={now} with {remaining} unfinished jobs and no time slice")]
    Stalled { now: Time, remaining: usize },
    #[error("time slice {slice} does not advance the clock at t={now}")]
    NoProgress { now: Time, slice: Time },
    #[error("job {job_id} never finished")]
    Unfinished { job_id: JobId },
}

impl SimError {
    /// True for engine bugs, false for bad input. `simulate` bounds every
    /// arrival and duration by `MAX_JOB_TIME`, which keeps the clock precise
    /// enough that a validated job set cannot stall or lose a slice.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Stalled { .. } | Self::NoProgress { .. } | Self::Unfinished { .. }
        )
    }
}
