use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;
use slotmap::SlotMap;
use tracing::{debug, info};

use super::{
    event::{Timeline, TimelineEvent},
    observer::Observer,
    state::{Job, JobId, JobKey, Time},
};
use crate::{error::SimError, scheduler::Policy};

/// Queue priority for jobs that have not arrived yet.
#[derive(Debug, Clone, Copy)]
struct Arrival {
    time: Time,
    job_id: JobId,
}

impl PartialEq for Arrival {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Arrival {}

impl PartialOrd for Arrival {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// KeyedPriorityQueue is a max-heap, so the earliest arrival must compare greatest
impl Ord for Arrival {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.job_id.cmp(&self.job_id))
    }
}

pub struct SimCore {
    policy: Policy,
    jobs: SlotMap<JobKey, Job>,
    // Insertion order, used for reporting
    order: Vec<JobKey>,
    // Jobs yet to arrive; its contents are the "future" partition
    pending: KeyedPriorityQueue<JobKey, Arrival>,
    // Arrived and unfinished
    runnable: Vec<JobKey>,
    now: Time,
    timeline: Timeline,
    observer: Observer,
}

impl SimCore {
    pub fn new(policy: Policy) -> Self {
        let mut timeline = Timeline::new();
        timeline.record(0.0, TimelineEvent::SimulationStart);

        Self {
            policy,
            jobs: SlotMap::with_key(),
            order: Vec::new(),
            pending: KeyedPriorityQueue::new(),
            runnable: Vec::new(),
            now: 0.0,
            timeline,
            observer: Observer::new(),
        }
    }

    pub fn add_job(&mut self, id: JobId, arrival: Time, duration: Time) -> JobKey {
        debug_assert!(
            self.jobs.values().all(|job| job.id != id),
            "Job {id} added twice"
        );

        let job = Job::new(id, arrival, duration, self.policy.records_state_changes());
        let key = self.jobs.insert(job);
        self.order.push(key);
        self.pending.push(key, Arrival { time: arrival, job_id: id });
        self.timeline.record(arrival, TimelineEvent::Arrived { job: id });
        key
    }

    pub fn run(&mut self) -> Result<(), SimError> {
        if self.jobs.is_empty() {
            return Err(SimError::EmptyJobSet);
        }

        while !self.is_finished() {
            self.step()?;
        }

        info!(
            policy = %self.policy.kind,
            jobs = self.jobs.len(),
            steps = self.observer.steps(),
            completed_at = self.now,
            "simulation complete"
        );
        Ok(())
    }

    /// Advance the clock to the next interesting instant.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.admit_arrivals();
        let now = self.now;

        // Candidate slices: run to completion, next arrival, quantum
        let mut next_slice: Option<Time> = None;

        let selected = self.select(now);
        if let Some(key) = selected {
            let job = &mut self.jobs[key];
            if !job.has_started() {
                self.timeline.record(
                    now,
                    TimelineEvent::Started {
                        job: job.id,
                        response: now - job.arrival,
                    },
                );
            }
            job.run(now);
            debug!(job = job.id, now, "dispatch");
            next_slice = shortest(next_slice, job.time_remaining(now));
        }

        if self.policy.preemptable || next_slice.is_none() {
            if let Some((_, next)) = self.pending.peek() {
                next_slice = shortest(next_slice, next.time - now);
            }
        }

        if let Some(quantum) = self.policy.time_quantum {
            next_slice = shortest(next_slice, quantum);
        }

        let Some(slice) = next_slice else {
            return Err(SimError::Stalled {
                now,
                remaining: self.remaining(),
            });
        };
        if now + slice <= now {
            return Err(SimError::NoProgress { now, slice });
        }

        if self.policy.records_state_changes() {
            let event = match selected {
                Some(key) => TimelineEvent::Ran {
                    job: self.jobs[key].id,
                    slice,
                },
                None => TimelineEvent::Idle,
            };
            self.timeline.record(now, event);
        }

        self.now = now + slice;

        if let Some(key) = selected {
            let job = &mut self.jobs[key];
            job.stop(self.now);
            debug!(job = job.id, now = self.now, slice, "stop");

            if let Some(turnaround) = job.turnaround_time {
                debug!(job = job.id, now = self.now, turnaround, "complete");
                self.timeline.record(
                    self.now,
                    TimelineEvent::Completed {
                        job: job.id,
                        turnaround,
                    },
                );
            }
        }

        let jobs = &self.jobs;
        self.runnable.retain(|&key| !jobs[key].is_complete());
        self.observer.observe(&self.jobs);
        Ok(())
    }

    fn admit_arrivals(&mut self) {
        while let Some((_, arrival)) = self.pending.peek() {
            if arrival.time > self.now {
                break;
            }
            if let Some((key, _)) = self.pending.pop() {
                self.runnable.push(key);
            }
        }
    }

    fn select(&self, now: Time) -> Option<JobKey> {
        let selector = self.policy.selector;
        self.runnable
            .iter()
            .copied()
            .min_by_key(|&key| selector(&self.jobs[key], now))
    }

    pub fn is_finished(&self) -> bool {
        self.runnable.is_empty() && self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.runnable.len() + self.pending.len()
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn job(&self, key: JobKey) -> &Job {
        &self.jobs[key]
    }

    /// Jobs in the order they were added.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().map(|&key| &self.jobs[key])
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Hand the recorded timeline to the caller once the run is over.
    pub fn take_timeline(&mut self) -> Timeline {
        std::mem::take(&mut self.timeline)
    }
}

fn shortest(current: Option<Time>, candidate: Time) -> Option<Time> {
    Some(match current {
        Some(slice) => slice.min(candidate),
        None => candidate,
    })
}
