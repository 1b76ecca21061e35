use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::storage::Database;

use super::tasks::run_configured_tasks;

/// Background service that runs the configured housekeeping tasks
pub struct SchedulerService {
    db: Arc<Database>,
    config: Arc<AppConfig>,
}

impl SchedulerService {
    pub fn new(db: Arc<Database>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Run the configured tasks in a loop until shutdown signal
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let interval_secs = self.config.scheduler.interval_secs;

        if interval_secs == 0 {
            info!("Scheduler disabled (interval_secs = 0)");
            // Still wait for shutdown
            let _ = shutdown.changed().await;
            return;
        }

        info!(
            "Scheduler started: {} task(s), every {}s",
            self.config.tasks.len(),
            interval_secs
        );

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        // Skip the first tick (fires immediately)
        interval.tick().await;

        loop {
            tokio::select! {
                // Handle shutdown signal
                result = shutdown.changed() => {
                    if result.is_ok() && *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                // Run the housekeeping tasks periodically
                _ = interval.tick() => {
                    debug!("Running scheduled housekeeping");
                    let completed = run_configured_tasks(&self.db, &self.config).await;
                    if completed > 0 {
                        info!("Scheduled housekeeping: {} task(s) completed", completed);
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn scheduler_exits_on_shutdown() {
        let db = Arc::new(Database::new_in_memory().await.unwrap());
        let config = Arc::new(AppConfig::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        let service = SchedulerService::new(db, config);
        let result = timeout(Duration::from_secs(1), service.run(shutdown_rx)).await;

        assert!(result.is_ok());
    }
}
