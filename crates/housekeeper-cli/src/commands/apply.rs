use anyhow::Result;

use housekeeper_core::{
    scheduler::{run_task, HousekeepingTask, TaskStatus},
    storage::Database,
};

pub async fn run(db: &Database, task: HousekeepingTask) -> Result<()> {
    if task.dry_run {
        println!(
            "Previewing '{}' on articles older than {} days (use --execute to apply)...",
            task.name, task.selection.age_days
        );
    } else {
        println!(
            "Running '{}' on articles older than {} days...",
            task.name, task.selection.age_days
        );
    }

    match run_task(db, &task).await? {
        TaskStatus::Ok => Ok(()),
        TaskStatus::Knockout => {
            anyhow::bail!("task '{}' rejected: invalid parameters", task.name)
        }
    }
}
