pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SimCore;
pub use event::{ROUNDING_DIGITS, Timeline, TimelineEntry, TimelineEvent};
pub use state::{Job, JobId, JobKey, JobState, SCHEDULER_EPSILON, Time};
