//! Repository layer for queue row operations
//!
//! CRUD operations for the durable write queue table.

use super::models::QueueItem;
use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository for durable queue rows
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a queue row. The seq column assigns replay order.
    pub async fn enqueue_item(
        &self,
        id: &str,
        op: &str,
        payload: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO write_queue (id, op, payload, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(op)
        .bind(payload)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Enqueued item: {} ({})", id, op);
        Ok(())
    }

    /// List every queued item in insertion order
    pub async fn list_items(&self) -> Result<Vec<QueueItem>> {
        let items = sqlx::query_as::<_, QueueItem>(
            r#"
            SELECT id, op, payload, created_at FROM write_queue
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Delete one item by id. Removing an absent id is a no-op.
    pub async fn remove_item(&self, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM write_queue WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows > 0 {
            tracing::debug!("Removed queue item: {}", id);
        }

        Ok(rows > 0)
    }

    /// Count queued items
    pub async fn count_items(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM write_queue")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    #[tokio::test]
    async fn test_enqueue_and_list() {
        let repo = create_test_repo().await;
        let now = Utc::now();

        repo.enqueue_item("a", "save_note", "{}", now).await.unwrap();
        repo.enqueue_item("b", "save_doubt", "{}", now).await.unwrap();

        let items = repo.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let repo = create_test_repo().await;
        let now = Utc::now();

        // Identical timestamps; order must come from the seq column
        for id in ["first", "second", "third"] {
            repo.enqueue_item(id, "update_profile", "{}", now)
                .await
                .unwrap();
        }

        let items = repo.list_items().await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let repo = create_test_repo().await;

        repo.enqueue_item("x", "save_note", "{}", Utc::now())
            .await
            .unwrap();

        assert!(repo.remove_item("x").await.unwrap());
        assert_eq!(repo.count_items().await.unwrap(), 0);

        // Removing again is a no-op
        assert!(!repo.remove_item("x").await.unwrap());
    }

    #[tokio::test]
    async fn test_count_items() {
        let repo = create_test_repo().await;

        assert_eq!(repo.count_items().await.unwrap(), 0);

        repo.enqueue_item("1", "save_note", "{}", Utc::now())
            .await
            .unwrap();
        repo.enqueue_item("2", "save_note", "{}", Utc::now())
            .await
            .unwrap();

        assert_eq!(repo.count_items().await.unwrap(), 2);
    }
}
