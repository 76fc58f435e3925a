pub mod jobs;
pub mod scheduler;
pub mod tracker;

pub use jobs::{DailyJobs, ReminderStats, RolloverStats};
pub use scheduler::JobScheduler;
pub use tracker::Tracker;
