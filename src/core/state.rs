use slotmap::new_key_type;

pub type JobId = u64;
pub type Time = f64;

/// Tolerance for completion checks.
///
/// It is also added to every reported response and turnaround time so an
/// immediate dispatch never shows up as exactly `0`. That bias is a
/// presentation artifact that answer keys depend on; it has no physical
/// meaning.
pub const SCHEDULER_EPSILON: Time = 1e-09;

new_key_type! {
    pub struct JobKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Waiting,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub arrival: Time,
    pub duration: Time,
    pub elapsed_time: Time,
    pub response_time: Option<Time>,
    pub turnaround_time: Option<Time>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    // Set while dispatched, cleared on stop
    pub unpause_time: Option<Time>,
    // Round-Robin selection key
    pub last_run: Time,
    pub state_change_times: Vec<Time>,
    records_state_changes: bool,
}

impl Job {
    pub fn new(id: JobId, arrival: Time, duration: Time, records_state_changes: bool) -> Self {
        Self {
            id,
            arrival,
            duration,
            elapsed_time: 0.0,
            response_time: None,
            turnaround_time: None,
            start_time: None,
            end_time: None,
            unpause_time: None,
            last_run: 0.0,
            state_change_times: Vec::new(),
            records_state_changes,
        }
    }

    pub fn run(&mut self, now: Time) {
        debug_assert!(!self.is_complete(), "Job {} dispatched after completing", self.id);
        debug_assert!(!self.is_running(), "Job {} dispatched while already running", self.id);

        if !self.has_started() {
            self.start_time = Some(now);
            self.response_time = Some(now - self.arrival + SCHEDULER_EPSILON);
        }
        self.unpause_time = Some(now);
        if self.records_state_changes {
            self.state_change_times.push(now);
        }
    }

    pub fn stop(&mut self, now: Time) {
        let unpaused = self
            .unpause_time
            .take()
            .expect("Job stopped without being dispatched");
        self.elapsed_time += now - unpaused;

        if self.is_complete() {
            self.end_time = Some(now);
            self.turnaround_time = Some(now - self.arrival + SCHEDULER_EPSILON);
        }
        self.last_run = now;
        if self.records_state_changes {
            self.state_change_times.push(now);
        }
    }

    /// Remaining work, counting the slice in progress without mutating state.
    pub fn time_remaining(&self, now: Time) -> Time {
        let mut remaining = self.duration - self.elapsed_time;
        if let Some(unpaused) = self.unpause_time {
            remaining -= now - unpaused;
        }
        remaining
    }

    pub fn is_complete(&self) -> bool {
        self.duration <= self.elapsed_time + SCHEDULER_EPSILON
    }

    pub fn has_started(&self) -> bool {
        self.response_time.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.unpause_time.is_some()
    }

    pub fn state(&self) -> JobState {
        if self.is_complete() {
            JobState::Completed
        } else if self.is_running() {
            JobState::Running
        } else {
            JobState::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_dispatch_sets_response_once() {
        let mut job = Job::new(0, 1.0, 4.0, true);
        assert!(!job.has_started());

        job.run(3.0);
        assert!(job.has_started());
        assert_eq!(job.response_time, Some(2.0 + SCHEDULER_EPSILON));
        job.stop(4.0);

        job.run(6.0);
        assert_eq!(job.response_time, Some(2.0 + SCHEDULER_EPSILON));
        assert_eq!(job.start_time, Some(3.0));
    }

    #[test]
    fn time_remaining_accounts_for_slice_in_progress() {
        let mut job = Job::new(0, 0.0, 10.0, true);
        job.run(0.0);
        assert_eq!(job.time_remaining(4.0), 6.0);
        assert_eq!(job.elapsed_time, 0.0);

        job.stop(4.0);
        assert_eq!(job.time_remaining(100.0), 6.0);
        assert_eq!(job.last_run, 4.0);
        assert_eq!(job.state(), JobState::Waiting);
    }

    #[test]
    fn completion_sets_turnaround() {
        let mut job = Job::new(3, 2.0, 5.0, true);
        job.run(2.0);
        assert_eq!(job.state(), JobState::Running);
        job.stop(7.0);

        assert!(job.is_complete());
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.turnaround_time, Some(5.0 + SCHEDULER_EPSILON));
        assert_eq!(job.end_time, Some(7.0));
        assert_eq!(job.state_change_times, vec![2.0, 7.0]);
    }

    #[test]
    fn completion_tolerates_rounding() {
        let mut job = Job::new(0, 0.0, 1.0, true);
        job.run(0.0);
        job.stop(1.0 - SCHEDULER_EPSILON / 2.0);
        assert!(job.is_complete());
    }

    #[test]
    fn state_changes_can_be_suppressed() {
        let mut job = Job::new(0, 0.0, 2.0, false);
        job.run(0.0);
        job.stop(1.0);
        job.run(1.5);
        job.stop(2.5);

        assert!(job.is_complete());
        assert!(job.state_change_times.is_empty());
    }
}
