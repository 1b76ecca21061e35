use sqlx::FromRow;

use super::Database;
use crate::content::Category;
use crate::Result;

/// Read-only access to the categories table
pub struct CategoryRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    lft: i64,
    rgt: i64,
    extension: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            lft: row.lft,
            rgt: row.rgt,
            extension: row.extension,
        }
    }
}

impl<'a> CategoryRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Find a category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, lft, rgt, extension FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(row.map(Category::from))
    }

    /// The category itself plus, when requested, all of its descendants.
    ///
    /// Descendants are the categories whose nested-set bounds lie strictly
    /// inside the source category's bounds and which belong to the same
    /// extension. A missing source category degrades to just its own id.
    pub async fn expand_subtree(
        &self,
        category_id: i64,
        include_subcategories: bool,
    ) -> Result<Vec<i64>> {
        let mut ids = vec![category_id];

        if !include_subcategories {
            return Ok(ids);
        }

        let parent = match self.find_by_id(category_id).await? {
            Some(parent) => parent,
            None => return Ok(ids),
        };

        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT id FROM categories WHERE lft > ? AND rgt < ? AND extension = ?",
        )
        .bind(parent.lft)
        .bind(parent.rgt)
        .bind(&parent.extension)
        .fetch_all(self.db.pool())
        .await?;

        ids.extend(rows.into_iter().map(|(id,)| id));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn insert_category(db: &Database, id: i64, lft: i64, rgt: i64, extension: &str) {
        sqlx::query("INSERT INTO categories (id, lft, rgt, extension) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(lft)
            .bind(rgt)
            .bind(extension)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn without_subcategories_returns_only_the_source() {
        let db = Database::new_in_memory().await.unwrap();
        insert_category(&db, 1, 1, 10, "content").await;
        insert_category(&db, 2, 2, 5, "content").await;

        let repo = CategoryRepository::new(&db);
        let ids = repo.expand_subtree(1, false).await.unwrap();

        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn missing_category_degrades_to_its_id() {
        let db = Database::new_in_memory().await.unwrap();

        let repo = CategoryRepository::new(&db);
        let ids = repo.expand_subtree(99, true).await.unwrap();

        assert_eq!(ids, vec![99]);
    }

    #[tokio::test]
    async fn expands_to_strictly_nested_same_extension_categories() {
        let db = Database::new_in_memory().await.unwrap();
        insert_category(&db, 1, 1, 10, "content").await;
        insert_category(&db, 2, 2, 5, "content").await; // child
        insert_category(&db, 3, 3, 4, "content").await; // grandchild
        insert_category(&db, 4, 6, 7, "menus").await; // nested but other extension
        insert_category(&db, 5, 11, 12, "content").await; // sibling, outside bounds

        let repo = CategoryRepository::new(&db);
        let mut ids = repo.expand_subtree(1, true).await.unwrap();
        ids.sort_unstable();

        assert_eq!(ids, vec![1, 2, 3]);
    }
}
