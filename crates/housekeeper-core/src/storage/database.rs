use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

use crate::config::AppConfig;
use crate::Result;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the content database and make sure the schema exists
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let db_path = config.database_path();

        // Ensure the data directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}", db_path.display());

        tracing::info!("Connecting to database: {}", db_path.display());

        // Use SqliteConnectOptions to set PRAGMAs per-connection, so every
        // connection in the pool has the same settings.
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Create an in-memory database for testing
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Create the articles and categories tables if they are missing
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA_ARTICLES).execute(&self.pool).await?;
        sqlx::query(SCHEMA_CATEGORIES).execute(&self.pool).await?;
        sqlx::query(SCHEMA_INDEXES).execute(&self.pool).await?;

        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

const SCHEMA_ARTICLES: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    catid INTEGER NOT NULL DEFAULT 0,
    state INTEGER NOT NULL DEFAULT 0,
    access INTEGER NOT NULL DEFAULT 1,
    created DATETIME,
    modified DATETIME,
    publish_up DATETIME
)
"#;

const SCHEMA_CATEGORIES: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lft INTEGER NOT NULL,
    rgt INTEGER NOT NULL,
    extension TEXT NOT NULL DEFAULT 'content'
)
"#;

const SCHEMA_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_articles_catid ON articles(catid);
CREATE INDEX IF NOT EXISTS idx_articles_state ON articles(state);
CREATE INDEX IF NOT EXISTS idx_articles_created ON articles(created);
CREATE INDEX IF NOT EXISTS idx_articles_modified ON articles(modified);
CREATE INDEX IF NOT EXISTS idx_articles_publish_up ON articles(publish_up);
CREATE INDEX IF NOT EXISTS idx_categories_bounds ON categories(lft, rgt)
"#;
