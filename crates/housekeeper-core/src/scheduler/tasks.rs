use tracing::{error, info};

use crate::config::{ActionKind, AppConfig, TaskConfig};
use crate::content::{Article, ArticleState, Selection};
use crate::storage::{ArticleRepository, Database};
use crate::Result;

/// Terminal status of one task invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Finished normally, including "nothing matched" and dry runs
    Ok,
    /// Refused to run because a required parameter was missing or invalid
    Knockout,
}

/// Bulk mutation applied to the selected articles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move { target_category: i64 },
    Archive,
    Unpublish,
    SetAccess { target_access: i64 },
}

/// A fully resolved housekeeping task
#[derive(Debug, Clone)]
pub struct HousekeepingTask {
    pub name: String,
    pub selection: Selection,
    pub action: Action,
    pub dry_run: bool,
}

impl HousekeepingTask {
    /// Resolve a config entry into a runnable task
    pub fn from_config(config: &TaskConfig) -> Self {
        let action = match config.action {
            ActionKind::Move => Action::Move {
                target_category: config.target_category,
            },
            ActionKind::Archive => Action::Archive,
            ActionKind::Unpublish => Action::Unpublish,
            ActionKind::SetAccess => Action::SetAccess {
                target_access: config.target_access,
            },
        };

        Self {
            name: config.name.clone(),
            selection: config.selection.clone(),
            action,
            dry_run: config.dry_run,
        }
    }
}

/// Run one housekeeping task against the content database.
///
/// A missing required parameter knocks the task out before any query runs.
/// Storage errors propagate to the caller; there is no retry.
pub async fn run_task(db: &Database, task: &HousekeepingTask) -> Result<TaskStatus> {
    match task.action {
        Action::Move { target_category } if target_category <= 0 => {
            error!("Task '{}': move requires a target category", task.name);
            return Ok(TaskStatus::Knockout);
        }
        Action::SetAccess { target_access } if target_access <= 0 => {
            error!("Task '{}': change access requires a target level", task.name);
            return Ok(TaskStatus::Knockout);
        }
        _ => {}
    }

    let article_repo = ArticleRepository::new(db);
    let articles = article_repo.select_stale(&task.selection).await?;

    if articles.is_empty() {
        info!("Task '{}': no matching articles", task.name);
        return Ok(TaskStatus::Ok);
    }

    if task.dry_run {
        log_preview(task, &articles);
        return Ok(TaskStatus::Ok);
    }

    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let updated = match task.action {
        Action::Move { target_category } => {
            article_repo.move_to_category(&ids, target_category).await?
        }
        Action::Archive => article_repo.set_state(&ids, ArticleState::Archived).await?,
        Action::Unpublish => {
            article_repo
                .set_state(&ids, ArticleState::Unpublished)
                .await?
        }
        Action::SetAccess { target_access } => {
            article_repo.set_access(&ids, target_access).await?
        }
    };

    info!("Task '{}': updated {} article(s)", task.name, updated);

    Ok(TaskStatus::Ok)
}

/// Summary plus one line per article, with the value about to change
fn log_preview(task: &HousekeepingTask, articles: &[Article]) {
    match task.action {
        Action::Move { target_category } => {
            info!(
                "Task '{}': would move {} article(s) to category {}",
                task.name,
                articles.len(),
                target_category
            );
            for article in articles {
                info!(
                    "  #{} '{}' (category {})",
                    article.id, article.title, article.catid
                );
            }
        }
        Action::Archive | Action::Unpublish => {
            let verb = if task.action == Action::Archive {
                "archive"
            } else {
                "unpublish"
            };
            info!(
                "Task '{}': would {} {} article(s)",
                task.name,
                verb,
                articles.len()
            );
            for article in articles {
                info!(
                    "  #{} '{}' ({})",
                    article.id,
                    article.title,
                    article.state.as_str()
                );
            }
        }
        Action::SetAccess { target_access } => {
            info!(
                "Task '{}': would set access level {} on {} article(s)",
                task.name,
                target_access,
                articles.len()
            );
            for article in articles {
                info!(
                    "  #{} '{}' (access {})",
                    article.id, article.title, article.access
                );
            }
        }
    }
}

/// Run every configured task once, returning how many finished Ok.
///
/// Per-task failures are logged and do not stop the remaining tasks.
pub async fn run_configured_tasks(db: &Database, config: &AppConfig) -> usize {
    let mut completed = 0;

    for task_config in &config.tasks {
        let task = HousekeepingTask::from_config(task_config);
        match run_task(db, &task).await {
            Ok(TaskStatus::Ok) => completed += 1,
            Ok(TaskStatus::Knockout) => {
                error!("Task '{}' knocked out: invalid parameters", task.name);
            }
            Err(e) => {
                error!("Task '{}' failed: {}", task.name, e);
            }
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    async fn insert_article(
        db: &Database,
        id: i64,
        catid: i64,
        state: i64,
        publish_up: Option<DateTime<Utc>>,
    ) {
        sqlx::query(
            "INSERT INTO articles (id, title, catid, state, access, publish_up) \
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(id)
        .bind(format!("Article {}", id))
        .bind(catid)
        .bind(state)
        .bind(publish_up)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn fetch_article(db: &Database, id: i64) -> (i64, i64, i64) {
        sqlx::query_as("SELECT catid, state, access FROM articles WHERE id = ?")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn task(action: Action, dry_run: bool) -> HousekeepingTask {
        HousekeepingTask {
            name: "test".to_string(),
            selection: Selection::default(),
            action,
            dry_run,
        }
    }

    #[tokio::test]
    async fn move_without_target_is_knocked_out() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(60))).await;

        let status = run_task(&db, &task(Action::Move { target_category: 0 }, false))
            .await
            .unwrap();

        assert_eq!(status, TaskStatus::Knockout);
        assert_eq!(fetch_article(&db, 1).await, (2, 1, 1));
    }

    #[tokio::test]
    async fn set_access_without_level_is_knocked_out() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(60))).await;

        let status = run_task(&db, &task(Action::SetAccess { target_access: 0 }, false))
            .await
            .unwrap();

        assert_eq!(status, TaskStatus::Knockout);
        assert_eq!(fetch_article(&db, 1).await, (2, 1, 1));
    }

    #[tokio::test]
    async fn no_matches_is_still_ok() {
        let db = Database::new_in_memory().await.unwrap();

        let status = run_task(&db, &task(Action::Archive, false)).await.unwrap();

        assert_eq!(status, TaskStatus::Ok);
    }

    #[tokio::test]
    async fn dry_run_leaves_storage_untouched() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;
        insert_article(&db, 2, 2, 1, Some(days_ago(10))).await;

        let status = run_task(&db, &task(Action::Archive, true)).await.unwrap();

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(fetch_article(&db, 1).await, (2, 1, 1));
        assert_eq!(fetch_article(&db, 2).await, (2, 1, 1));
    }

    #[tokio::test]
    async fn archive_updates_exactly_the_matched_articles() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;
        insert_article(&db, 2, 2, 1, Some(days_ago(10))).await;

        let status = run_task(&db, &task(Action::Archive, false)).await.unwrap();

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(fetch_article(&db, 1).await, (2, 2, 1));
        assert_eq!(fetch_article(&db, 2).await, (2, 1, 1));
    }

    #[tokio::test]
    async fn unpublish_sets_the_unpublished_state() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;

        let status = run_task(&db, &task(Action::Unpublish, false)).await.unwrap();

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(fetch_article(&db, 1).await, (2, 0, 1));
    }

    #[tokio::test]
    async fn move_changes_the_category() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;

        let status = run_task(&db, &task(Action::Move { target_category: 9 }, false))
            .await
            .unwrap();

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(fetch_article(&db, 1).await, (9, 1, 1));
    }

    #[tokio::test]
    async fn set_access_changes_the_access_level() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;

        let status = run_task(&db, &task(Action::SetAccess { target_access: 3 }, false))
            .await
            .unwrap();

        assert_eq!(status, TaskStatus::Ok);
        assert_eq!(fetch_article(&db, 1).await, (2, 1, 3));
    }

    #[tokio::test]
    async fn configured_tasks_run_in_order_and_count_completions() {
        let db = Database::new_in_memory().await.unwrap();
        insert_article(&db, 1, 2, 1, Some(days_ago(45))).await;

        let config: AppConfig = toml::from_str(
            r#"
            [[task]]
            name = "archive"
            action = "archive"
            dry_run = false

            [[task]]
            name = "broken move"
            action = "move"
            dry_run = false
            "#,
        )
        .unwrap();

        let completed = run_configured_tasks(&db, &config).await;

        assert_eq!(completed, 1);
        assert_eq!(fetch_article(&db, 1).await, (2, 2, 1));
    }
}
