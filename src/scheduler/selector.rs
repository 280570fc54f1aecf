use std::cmp::Ordering;

use crate::core::{Job, JobId, Time};

/// Picks among available jobs: the smallest key runs next.
pub type Selector = fn(&Job, Time) -> SelectorKey;

#[derive(Debug, Clone, Copy)]
pub struct SelectorKey {
    primary: f64,
    job_id: JobId,
}

impl SelectorKey {
    pub fn new(primary: f64, job_id: JobId) -> Self {
        // -0.0 + 0.0 == 0.0, keeps a negated zero arrival equal to its peers
        Self {
            primary: primary + 0.0,
            job_id,
        }
    }

    pub fn primary(&self) -> f64 {
        self.primary
    }
}

impl PartialEq for SelectorKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SelectorKey {}

impl PartialOrd for SelectorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Ties always fall through to the job id
impl Ord for SelectorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.job_id.cmp(&other.job_id))
    }
}

pub fn by_arrival(job: &Job, _now: Time) -> SelectorKey {
    SelectorKey::new(job.arrival, job.id)
}

pub fn by_latest_arrival(job: &Job, _now: Time) -> SelectorKey {
    SelectorKey::new(-job.arrival, job.id)
}

pub fn by_duration(job: &Job, _now: Time) -> SelectorKey {
    SelectorKey::new(job.duration, job.id)
}

pub fn by_time_remaining(job: &Job, now: Time) -> SelectorKey {
    SelectorKey::new(job.time_remaining(now), job.id)
}

pub fn by_last_run(job: &Job, _now: Time) -> SelectorKey {
    SelectorKey::new(job.last_run, job.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_job_id() {
        let a = Job::new(4, 2.0, 3.0, true);
        let b = Job::new(1, 2.0, 3.0, true);
        assert!(by_arrival(&b, 0.0) < by_arrival(&a, 0.0));
        assert!(by_duration(&b, 0.0) < by_duration(&a, 0.0));
    }

    #[test]
    fn latest_arrival_sorts_first() {
        let early = Job::new(0, 0.0, 3.0, true);
        let late = Job::new(1, 5.0, 3.0, true);
        assert!(by_latest_arrival(&late, 5.0) < by_latest_arrival(&early, 5.0));

        let also_early = Job::new(2, 0.0, 1.0, true);
        assert!(by_latest_arrival(&early, 5.0) < by_latest_arrival(&also_early, 5.0));
        assert_eq!(by_latest_arrival(&early, 5.0).primary(), 0.0);
    }

    #[test]
    fn time_remaining_tracks_running_slice() {
        let mut long = Job::new(0, 0.0, 10.0, true);
        let short = Job::new(1, 2.0, 3.0, true);
        long.run(0.0);
        assert!(by_time_remaining(&long, 2.0) > by_time_remaining(&short, 2.0));
        assert!(by_time_remaining(&long, 8.0) < by_time_remaining(&short, 8.0));
    }
}
