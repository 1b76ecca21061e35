use anyhow::Result;

use housekeeper_core::{scheduler::run_configured_tasks, storage::Database, AppConfig};

pub async fn run(db: &Database, config: &AppConfig) -> Result<()> {
    if config.tasks.is_empty() {
        println!("No housekeeping tasks configured.");
        println!(
            "\nAdd [[task]] entries to {}",
            AppConfig::config_path().display()
        );
        return Ok(());
    }

    println!("Running {} housekeeping task(s)...", config.tasks.len());

    let completed = run_configured_tasks(db, config).await;

    println!("{} of {} task(s) completed.", completed, config.tasks.len());

    if completed < config.tasks.len() {
        anyhow::bail!("some housekeeping tasks did not complete");
    }

    Ok(())
}
