mod service;
pub mod tasks;

pub use service::SchedulerService;
pub use tasks::{run_configured_tasks, run_task, Action, HousekeepingTask, TaskStatus};
