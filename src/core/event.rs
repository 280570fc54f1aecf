use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::core::{JobId, Time};

/// Decimal places used when event descriptions print times.
pub const ROUNDING_DIGITS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    SimulationStart,
    Arrived { job: JobId },
    // Unbiased, measured from arrival to first dispatch
    Started { job: JobId, response: Time },
    Ran { job: JobId, slice: Time },
    // No job available for the coming slice
    Idle,
    Completed { job: JobId, turnaround: Time },
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = ROUNDING_DIGITS;
        match self {
            Self::SimulationStart => write!(f, "Simulation Start"),
            Self::Arrived { job } => write!(f, "Job{job} arrived"),
            Self::Started { job, response } => {
                write!(f, "Starting Job{job} (resp = {response:.p$}s)")
            }
            Self::Ran { job, slice } => write!(f, "Running Job{job} for {slice:.p$}s"),
            Self::Idle => write!(f, "(No job running)"),
            Self::Completed { job, turnaround } => {
                write!(f, "Completed Job{job} (TAT = {turnaround:.p$}s)")
            }
        }
    }
}

impl Serialize for TimelineEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Every event recorded at one instant, in recording order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub time: Time,
    pub events: Vec<TimelineEvent>,
}

impl TimelineEntry {
    pub fn descriptions(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

/// Events grouped by the exact instant they happened at.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    // f64 bit pattern --> entries[index]
    by_time: FxHashMap<u64, usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, time: Time, event: TimelineEvent) {
        // Fold -0.0 into 0.0 so both land in one bucket
        let time = time + 0.0;
        let index = *self.by_time.entry(time.to_bits()).or_insert_with(|| {
            self.entries.push(TimelineEntry {
                time,
                events: Vec::new(),
            });
            self.entries.len() - 1
        });
        self.entries[index].events.push(event);
    }

    /// Entries in ascending time order.
    pub fn entries(&self) -> Vec<&TimelineEntry> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        entries
    }

    pub fn events_at(&self, time: Time) -> &[TimelineEvent] {
        self.by_time
            .get(&(time + 0.0).to_bits())
            .map(|&index| self.entries[index].events.as_slice())
            .unwrap_or(&[])
    }
}

impl Serialize for Timeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for entry in entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_round_to_two_places() {
        let started = TimelineEvent::Started {
            job: 1,
            response: 4.0,
        };
        let ran = TimelineEvent::Ran {
            job: 1,
            slice: 2.0 / 3.0,
        };
        let done = TimelineEvent::Completed {
            job: 1,
            turnaround: 6.0 + 1e-9,
        };

        assert_eq!(started.to_string(), "Starting Job1 (resp = 4.00s)");
        assert_eq!(ran.to_string(), "Running Job1 for 0.67s");
        assert_eq!(done.to_string(), "Completed Job1 (TAT = 6.00s)");
        assert_eq!(TimelineEvent::Idle.to_string(), "(No job running)");
    }

    #[test]
    fn events_group_by_instant_in_time_order() {
        let mut timeline = Timeline::new();
        timeline.record(5.0, TimelineEvent::Arrived { job: 1 });
        timeline.record(0.0, TimelineEvent::SimulationStart);
        timeline.record(-0.0, TimelineEvent::Arrived { job: 0 });
        timeline.record(5.0, TimelineEvent::Idle);

        let entries = timeline.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].time, 0.0);
        assert_eq!(
            entries[0].descriptions(),
            vec!["Simulation Start", "Job0 arrived"]
        );
        assert_eq!(
            timeline.events_at(5.0),
            &[TimelineEvent::Arrived { job: 1 }, TimelineEvent::Idle]
        );
        assert!(timeline.events_at(3.0).is_empty());
    }
}
