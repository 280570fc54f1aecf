use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    core::state::{JobId, Time},
    error::SimError,
    sim::driver::MAX_JOB_TIME,
};

/// A job as handed to the simulator; never mutated by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    pub arrival: Time,
    pub duration: Time,
}

impl JobSpec {
    pub fn new(id: JobId, arrival: Time, duration: Time) -> Self {
        Self {
            id,
            arrival,
            duration,
        }
    }
}

/// Bounds for randomly generated job sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_jobs: usize,
    pub max_arrival_time: u32,
    pub min_duration: u32,
    pub max_duration: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_jobs: 3,
            max_arrival_time: 10,
            min_duration: 2,
            max_duration: 10,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_jobs == 0 {
            return Err(SimError::InvalidConfig("num_jobs must be at least 1".into()));
        }
        if self.min_duration == 0 {
            return Err(SimError::InvalidConfig(
                "min_duration must be at least 1".into(),
            ));
        }
        let largest = self.max_arrival_time.max(self.max_duration);
        if f64::from(largest) > MAX_JOB_TIME {
            return Err(SimError::InvalidConfig(format!(
                "max_arrival_time and max_duration must be at most {MAX_JOB_TIME}, got {largest}"
            )));
        }
        if self.min_duration > self.max_duration {
            return Err(SimError::InvalidConfig(format!(
                "min_duration {} exceeds max_duration {}",
                self.min_duration, self.max_duration
            )));
        }
        Ok(())
    }
}

/// Whole-valued arrivals and durations, ids `0..num_jobs`.
pub fn random_jobs<R: Rng>(rng: &mut R, config: &GeneratorConfig) -> Result<Vec<JobSpec>, SimError> {
    config.validate()?;

    let jobs = (0..config.num_jobs)
        .map(|id| {
            let arrival = rng.random_range(0..=config.max_arrival_time);
            let duration = rng.random_range(config.min_duration..=config.max_duration);
            JobSpec::new(id as JobId, f64::from(arrival), f64::from(duration))
        })
        .collect();

    Ok(jobs)
}
