pub mod selector;

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{core::Time, error::SimError};
pub use selector::{Selector, SelectorKey};

/// Small enough that Round-Robin approximates processor sharing.
pub const ROUND_ROBIN_QUANTUM: Time = 1e-04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    Fifo,
    Lifo,
    ShortestDuration,
    ShortestTimeRemaining,
    RoundRobin,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Fifo,
        PolicyKind::Lifo,
        PolicyKind::ShortestDuration,
        PolicyKind::ShortestTimeRemaining,
        PolicyKind::RoundRobin,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lifo => "LIFO",
            Self::ShortestDuration => "Shortest Job First",
            Self::ShortestTimeRemaining => "Shortest Remaining Time to Completion",
            Self::RoundRobin => "Round Robin",
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "fifo" | "fcfs" => Ok(Self::Fifo),
            "lifo" => Ok(Self::Lifo),
            "sjf" | "shortestduration" | "shortestjobfirst" => Ok(Self::ShortestDuration),
            "srtf" | "stcf" | "shortesttimeremaining" => Ok(Self::ShortestTimeRemaining),
            "rr" | "roundrobin" => Ok(Self::RoundRobin),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Everything the engine needs to know about a scheduling discipline.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub kind: PolicyKind,
    pub selector: Selector,
    /// A running job may be interrupted when another job arrives.
    pub preemptable: bool,
    /// Upper bound on a single dispatch.
    pub time_quantum: Option<Time>,
}

impl Policy {
    /// Round-Robin slices are too fine to be worth logging one by one.
    pub fn records_state_changes(&self) -> bool {
        self.kind != PolicyKind::RoundRobin
    }
}

pub fn policy_for(kind: PolicyKind) -> Policy {
    let (selector, preemptable, time_quantum) = match kind {
        PolicyKind::Fifo => (selector::by_arrival as Selector, false, None),
        PolicyKind::Lifo => (selector::by_latest_arrival as Selector, true, None),
        PolicyKind::ShortestDuration => (selector::by_duration as Selector, false, None),
        PolicyKind::ShortestTimeRemaining => {
            (selector::by_time_remaining as Selector, true, None)
        }
        PolicyKind::RoundRobin => (
            selector::by_last_run as Selector,
            true,
            Some(ROUND_ROBIN_QUANTUM),
        ),
    };

    Policy {
        kind,
        selector,
        preemptable,
        time_quantum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_round_robin_has_a_quantum() {
        for kind in PolicyKind::ALL {
            let policy = policy_for(kind);
            assert_eq!(policy.kind, kind);
            assert_eq!(
                policy.time_quantum.is_some(),
                kind == PolicyKind::RoundRobin
            );
            assert_eq!(policy.records_state_changes(), kind != PolicyKind::RoundRobin);
        }
    }

    #[test]
    fn preemption_flags() {
        assert!(!policy_for(PolicyKind::Fifo).preemptable);
        assert!(!policy_for(PolicyKind::ShortestDuration).preemptable);
        assert!(policy_for(PolicyKind::Lifo).preemptable);
        assert!(policy_for(PolicyKind::ShortestTimeRemaining).preemptable);
        assert!(policy_for(PolicyKind::RoundRobin).preemptable);
    }

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("FIFO".parse::<PolicyKind>().unwrap(), PolicyKind::Fifo);
        assert_eq!("sjf".parse::<PolicyKind>().unwrap(), PolicyKind::ShortestDuration);
        assert_eq!(
            "shortest-time-remaining".parse::<PolicyKind>().unwrap(),
            PolicyKind::ShortestTimeRemaining
        );
        assert_eq!("Round Robin".parse::<PolicyKind>().unwrap(), PolicyKind::RoundRobin);
        assert!(matches!(
            "lottery".parse::<PolicyKind>(),
            Err(SimError::UnknownPolicy(name)) if name == "lottery"
        ));
    }
}
