pub mod driver;
pub mod job;
pub mod report;

pub use driver::{MAX_JOB_TIME, simulate, validate};
pub use job::{GeneratorConfig, JobSpec, random_jobs};
pub use report::{AggregateStats, JobStats, SimReport};
