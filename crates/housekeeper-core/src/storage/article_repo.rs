use chrono::{Duration, Utc};
use sqlx::FromRow;

use super::{CategoryRepository, Database};
use crate::content::{Article, ArticleState, Selection, StateFilter};
use crate::Result;

/// Sentinel some content schemas store instead of NULL for "no date"
const ZERO_DATE: &str = "0000-00-00 00:00:00";

/// Selection and bulk mutation of rows in the articles table
pub struct ArticleRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    catid: i64,
    state: i64,
    access: i64,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            catid: row.catid,
            state: ArticleState::from_code(row.state).unwrap_or_default(),
            access: row.access,
        }
    }
}

impl<'a> ArticleRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Articles whose chosen date column is older than the age cutoff.
    ///
    /// Rows with a NULL or zero-sentinel date never match. Returns an empty
    /// vec (not an error) when nothing does.
    pub async fn select_stale(&self, selection: &Selection) -> Result<Vec<Article>> {
        let cutoff = Utc::now() - Duration::days(i64::from(selection.age_days));

        // The column name comes from the DateField enum, never from user text
        let mut sql = format!(
            "SELECT id, title, catid, state, access FROM articles \
             WHERE {0} IS NOT NULL AND {0} <> ? AND {0} < ?",
            selection.date_field.column()
        );

        let categories = if selection.source_category > 0 {
            let category_repo = CategoryRepository::new(self.db);
            let ids = category_repo
                .expand_subtree(selection.source_category, selection.include_subcategories)
                .await?;

            let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
            sql.push_str(&format!(" AND catid IN ({})", placeholders.join(", ")));
            ids
        } else {
            Vec::new()
        };

        if let StateFilter::State(_) = selection.state_filter {
            sql.push_str(" AND state = ?");
        }

        let mut query = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(ZERO_DATE)
            .bind(cutoff);
        for id in &categories {
            query = query.bind(*id);
        }
        if let StateFilter::State(state) = selection.state_filter {
            query = query.bind(state.code());
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Move the given articles to another category
    pub async fn move_to_category(&self, ids: &[i64], target_category: i64) -> Result<u64> {
        self.bulk_update("catid", target_category, ids).await
    }

    /// Set the publication state of the given articles
    pub async fn set_state(&self, ids: &[i64], state: ArticleState) -> Result<u64> {
        self.bulk_update("state", state.code(), ids).await
    }

    /// Set the access level of the given articles
    pub async fn set_access(&self, ids: &[i64], target_access: i64) -> Result<u64> {
        self.bulk_update("access", target_access, ids).await
    }

    /// One UPDATE statement covering exactly the given ids
    async fn bulk_update(&self, column: &str, value: i64, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let sql = format!(
            "UPDATE articles SET {} = ? WHERE id IN ({})",
            column,
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql).bind(value);
        for id in ids {
            query = query.bind(*id);
        }

        let result = query.execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }
}
