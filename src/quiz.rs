// Plain-text question assembly; richer rendering consumes SchedulingQuestion as data

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    core::{ROUNDING_DIGITS, Time},
    error::SimError,
    scheduler::PolicyKind,
    sim::{AggregateStats, GeneratorConfig, JobStats, SimReport, random_jobs, simulate},
};

/// Turnaround must exceed total work by this factor for an instance to be
/// worth asking about.
pub const INTERESTING_TAT_RATIO: f64 = 1.1;

pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuizError {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("no interesting {policy} instance after {attempts} attempts")]
    Uninteresting { policy: PolicyKind, attempts: usize },
}

/// One blank in the answer key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub key: String,
    pub value: Time,
}

impl Answer {
    fn new(key: impl Into<String>, value: Time) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn rounded(&self) -> String {
        format!("{:.*}", ROUNDING_DIGITS, self.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulingQuestion {
    pub kind: PolicyKind,
    pub report: SimReport,
    pub aggregate: AggregateStats,
}

impl SchedulingQuestion {
    pub fn new(kind: PolicyKind, report: SimReport) -> Result<Self, QuizError> {
        let aggregate = report.aggregate_stats()?;
        Ok(Self {
            kind,
            report,
            aggregate,
        })
    }

    /// Simulate random job sets until one is interesting.
    ///
    /// Regeneration is the caller's call, not the engine's: any simulation
    /// error aborts at once rather than being retried.
    pub fn generate<R: Rng>(
        rng: &mut R,
        kind: PolicyKind,
        config: &GeneratorConfig,
        max_attempts: usize,
    ) -> Result<Self, QuizError> {
        for attempt in 1..=max_attempts {
            let jobs = random_jobs(rng, config)?;
            let question = Self::new(kind, simulate(&jobs, kind)?)?;
            if question.is_interesting() {
                debug!(policy = %kind, attempt, "generated question");
                return Ok(question);
            }
            debug!(policy = %kind, attempt, "instance not interesting, regenerating");
        }

        warn!(policy = %kind, max_attempts, "giving up on interesting instance");
        Err(QuizError::Uninteresting {
            policy: kind,
            attempts: max_attempts,
        })
    }

    /// Jobs in id order, the order every table and answer list uses.
    pub fn jobs_by_id(&self) -> Vec<&JobStats> {
        let mut jobs: Vec<_> = self.report.per_job_stats().iter().collect();
        jobs.sort_by_key(|job| job.id);
        jobs
    }

    /// True when jobs spent a noticeable share of their time waiting.
    pub fn is_interesting(&self) -> bool {
        let jobs = self.report.per_job_stats();
        let duration_sum: Time = jobs.iter().map(|job| job.duration).sum();
        let turnaround_sum: Time = jobs.iter().map(|job| job.turnaround_time).sum();
        turnaround_sum >= duration_sum * INTERESTING_TAT_RATIO
    }

    pub fn prelude(&self) -> String {
        format!(
            "Given the below information, compute the required values if using {} scheduling. \
             Break any ties using the job number.",
            self.kind.display_name()
        )
    }

    pub fn answers(&self) -> Vec<Answer> {
        let mut answers = Vec::new();
        for job in self.jobs_by_id() {
            answers.push(Answer::new(
                format!("answer__response_time_job{}", job.id),
                job.response_time,
            ));
            answers.push(Answer::new(
                format!("answer__turnaround_time_job{}", job.id),
                job.turnaround_time,
            ));
        }
        answers.push(Answer::new(
            "answer__average_response_time",
            self.aggregate.average_response_time,
        ));
        answers.push(Answer::new(
            "answer__average_turnaround_time",
            self.aggregate.average_turnaround_time,
        ));
        answers
    }

    pub fn explanation(&self) -> Vec<String> {
        let p = ROUNDING_DIGITS;
        let jobs = self.jobs_by_id();
        let mut lines = vec![
            format!(
                "To calculate the overall Turnaround and Response times using {} we first \
                 calculate the turnaround and response times of each individual job.",
                self.kind.display_name()
            ),
            "We do this by subtracting arrival time from either the completion time or the start time. That is:".into(),
            "Job_TAT = Job_completion - Job_arrival".into(),
            "Job_response = Job_start - Job_arrival".into(),
            String::new(),
            format!("For each of our {} jobs, we can make these calculations.", jobs.len()),
            String::new(),
            "For turnaround time (TAT) this would be:".into(),
        ];

        for job in &jobs {
            lines.push(format!(
                "Job{}_TAT = {:.p$} - {:.p$} = {:.p$}",
                job.id,
                job.arrival + job.turnaround_time,
                job.arrival,
                job.turnaround_time
            ));
        }
        lines.push(String::new());
        lines.push("We then calculate the average of these to find the average TAT time".into());
        lines.push(average_line(
            "TAT",
            jobs.iter().map(|job| job.turnaround_time),
            self.aggregate.average_turnaround_time,
        ));
        lines.push(String::new());

        lines.push("For response time this would be:".into());
        for job in &jobs {
            lines.push(format!(
                "Job{}_response = {:.p$} - {:.p$} = {:.p$}",
                job.id,
                job.arrival + job.response_time,
                job.arrival,
                job.response_time
            ));
        }
        lines.push(String::new());
        lines.push("We then calculate the average of these to find the average Response time".into());
        lines.push(average_line(
            "Response",
            jobs.iter().map(|job| job.response_time),
            self.aggregate.average_response_time,
        ));
        lines.push(String::new());

        lines.push("We can track these events in a table:".into());
        for entry in self.report.timeline().entries() {
            lines.push(format!(
                "{:02.p$}s | {}",
                entry.time,
                entry.descriptions().join("; ")
            ));
        }

        lines
    }
}

fn average_line(label: &str, values: impl Iterator<Item = Time>, average: Time) -> String {
    let p = ROUNDING_DIGITS;
    let values: Vec<String> = values.map(|value| format!("{value:.p$}")).collect();
    format!(
        "Avg({label}) = ({}) / ({}) = {average:.p$}",
        values.join(" + "),
        values.len()
    )
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::sim::JobSpec;

    fn fifo_question() -> SchedulingQuestion {
        let jobs = [JobSpec::new(1, 1.0, 2.0), JobSpec::new(0, 0.0, 5.0)];
        let report = simulate(&jobs, PolicyKind::Fifo).unwrap();
        SchedulingQuestion::new(PolicyKind::Fifo, report).unwrap()
    }

    #[test]
    fn answers_follow_job_ids_then_averages() {
        let question = fifo_question();
        let answers = question.answers();
        let keys: Vec<_> = answers.iter().map(|answer| answer.key.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                "answer__response_time_job0",
                "answer__turnaround_time_job0",
                "answer__response_time_job1",
                "answer__turnaround_time_job1",
                "answer__average_response_time",
                "answer__average_turnaround_time",
            ]
        );
        assert_eq!(answers[2].rounded(), "4.00");
        assert_eq!(answers[3].rounded(), "6.00");
        assert_eq!(answers[5].rounded(), "5.50");
    }

    #[test]
    fn waiting_makes_an_instance_interesting() {
        assert!(fifo_question().is_interesting());

        let jobs = [JobSpec::new(0, 0.0, 2.0), JobSpec::new(1, 5.0, 2.0)];
        let report = simulate(&jobs, PolicyKind::Fifo).unwrap();
        let question = SchedulingQuestion::new(PolicyKind::Fifo, report).unwrap();
        assert!(!question.is_interesting());
    }

    #[test]
    fn explanation_shows_per_job_work() {
        let lines = fifo_question().explanation();
        assert!(lines.contains(&"Job1_TAT = 7.00 - 1.00 = 6.00".to_string()));
        assert!(lines.contains(&"Job1_response = 5.00 - 1.00 = 4.00".to_string()));
        assert!(lines.contains(&"Avg(TAT) = (5.00 + 6.00) / (2) = 5.50".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("0.00s | Simulation Start; Job0 arrived")));
    }

    #[test]
    fn prelude_names_the_policy() {
        assert!(fifo_question().prelude().contains("using FIFO scheduling"));
    }

    #[test]
    fn generation_gives_up_after_budget() {
        // A single job never waits, so it is never interesting
        let config = GeneratorConfig {
            num_jobs: 1,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let err = SchedulingQuestion::generate(&mut rng, PolicyKind::Fifo, &config, 5).unwrap_err();
        assert_eq!(
            err,
            QuizError::Uninteresting {
                policy: PolicyKind::Fifo,
                attempts: 5
            }
        );
    }

    #[test]
    fn generation_finds_interesting_instances() {
        let config = GeneratorConfig {
            num_jobs: 4,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(21);
        for kind in [PolicyKind::Fifo, PolicyKind::ShortestTimeRemaining] {
            let question =
                SchedulingQuestion::generate(&mut rng, kind, &config, DEFAULT_MAX_ATTEMPTS).unwrap();
            assert!(question.is_interesting());
            assert_eq!(question.report.per_job_stats().len(), 4);
        }
    }

    #[test]
    fn config_errors_surface_immediately() {
        let config = GeneratorConfig {
            num_jobs: 0,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = SchedulingQuestion::generate(&mut rng, PolicyKind::Lifo, &config, 10).unwrap_err();
        assert!(matches!(err, QuizError::Sim(SimError::InvalidConfig(_))));
    }
}
