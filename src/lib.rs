pub mod core;
pub mod error;
pub mod quiz;
pub mod scheduler;
pub mod sim;

pub use error::SimError;
pub use quiz::{QuizError, SchedulingQuestion};
pub use scheduler::{Policy, PolicyKind, policy_for};
pub use sim::{JobSpec, SimReport, simulate};
