use std::path::PathBuf;

use anyhow::{Context, Result};
use average::{Estimate, Max, Variance};
use clap::Parser;
use rand::prelude::*;
use sched_quiz::{
    PolicyKind, SchedulingQuestion,
    core::ROUNDING_DIGITS,
    quiz::{Answer, DEFAULT_MAX_ATTEMPTS},
    sim::{GeneratorConfig, JobSpec, random_jobs, simulate},
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulate CPU scheduling policies and print quiz-ready answers.
#[derive(Parser)]
#[command(name = "sched_quiz")]
struct Cli {
    /// Scheduling policy (fifo, lifo, sjf, srtf, rr). Random when omitted.
    #[arg(short, long)]
    policy: Option<PolicyKind>,

    /// JSON file holding an array of {id, arrival, duration} jobs.
    #[arg(long, value_name = "PATH", conflicts_with = "trials")]
    jobs_file: Option<PathBuf>,

    /// Number of jobs to generate.
    #[arg(short = 'n', long, default_value_t = 3)]
    num_jobs: usize,

    /// Latest possible arrival time of a generated job.
    #[arg(long, default_value_t = 10)]
    max_arrival: u32,

    /// Shortest possible duration of a generated job.
    #[arg(long, default_value_t = 2)]
    min_duration: u32,

    /// Longest possible duration of a generated job.
    #[arg(long, default_value_t = 10)]
    max_duration: u32,

    /// PRNG seed for job generation. Falls back to SCHED_QUIZ_SEED, then entropy.
    #[arg(long, env = "SCHED_QUIZ_SEED")]
    seed: Option<u64>,

    /// Regenerate until the instance makes jobs wait.
    #[arg(long)]
    interesting: bool,

    /// Attempts allowed for --interesting.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Run this many random instances and summarize their averages.
    #[arg(long, value_name = "N")]
    trials: Option<usize>,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            num_jobs: self.num_jobs,
            max_arrival_time: self.max_arrival,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
        }
    }
}

#[derive(Serialize)]
struct Output<'a> {
    seed: Option<u64>,
    prelude: String,
    question: &'a SchedulingQuestion,
    answers: Vec<Answer>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "seeding job generator");
    let mut rng = StdRng::seed_from_u64(seed);
    let kind = cli.policy.unwrap_or_else(|| PolicyKind::random(&mut rng));

    if let Some(trials) = cli.trials {
        return survey(&cli, kind, trials, &mut rng);
    }

    let question = match &cli.jobs_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let jobs: Vec<JobSpec> = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse jobs in {}", path.display()))?;
            let report = simulate(&jobs, kind).context("simulation failed")?;
            SchedulingQuestion::new(kind, report)?
        }
        None if cli.interesting => {
            SchedulingQuestion::generate(&mut rng, kind, &cli.generator_config(), cli.max_attempts)?
        }
        None => {
            let jobs = random_jobs(&mut rng, &cli.generator_config())?;
            let report = simulate(&jobs, kind).context("simulation failed")?;
            SchedulingQuestion::new(kind, report)?
        }
    };

    if cli.json {
        let output = Output {
            seed: cli.jobs_file.is_none().then_some(seed),
            prelude: question.prelude(),
            question: &question,
            answers: question.answers(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_question(&question);
    }

    Ok(())
}

fn print_question(question: &SchedulingQuestion) {
    let p = ROUNDING_DIGITS;

    println!("{}", question.prelude());
    println!();
    println!(
        "{:<6} {:>8} {:>8} {:>10} {:>10}",
        "Job", "Arrival", "Duration", "Response", "TAT"
    );
    for job in question.jobs_by_id() {
        println!(
            "{:<6} {:>8.p$} {:>8.p$} {:>10.p$} {:>10.p$}",
            format!("Job{}", job.id),
            job.arrival,
            job.duration,
            job.response_time,
            job.turnaround_time
        );
    }
    println!();
    println!(
        "Average response time: {:.p$}",
        question.aggregate.average_response_time
    );
    println!(
        "Average turnaround time: {:.p$}",
        question.aggregate.average_turnaround_time
    );
    println!();

    for entry in question.report.timeline().entries() {
        for event in &entry.events {
            println!("t={:.p$} {event}", entry.time);
        }
    }
}

fn survey(cli: &Cli, kind: PolicyKind, trials: usize, rng: &mut StdRng) -> Result<()> {
    anyhow::ensure!(trials > 0, "--trials must be at least 1");

    let config = cli.generator_config();
    let mut response = Variance::new();
    let mut turnaround = Variance::new();
    let mut worst_turnaround = Max::new();

    for trial in 0..trials {
        let jobs = random_jobs(rng, &config)?;
        let report = simulate(&jobs, kind).with_context(|| format!("trial {trial} failed"))?;
        let aggregate = report.aggregate_stats()?;

        response.add(aggregate.average_response_time);
        turnaround.add(aggregate.average_turnaround_time);
        for job in report.per_job_stats() {
            worst_turnaround.add(job.turnaround_time);
        }
    }

    let p = ROUNDING_DIGITS;
    println!("{kind} over {trials} instances of {} jobs", config.num_jobs);
    println!(
        "Average response time: {:.p$} (sd {:.p$})",
        response.mean(),
        response.sample_variance().sqrt()
    );
    println!(
        "Average turnaround time: {:.p$} (sd {:.p$})",
        turnaround.mean(),
        turnaround.sample_variance().sqrt()
    );
    println!("Longest turnaround: {:.p$}", worst_turnaround.max());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
