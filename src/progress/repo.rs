use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::error::AppResult;
use crate::progress::repo_types::{NewProgress, Progress, RecentProgress};

#[async_trait]
pub trait ProgressRepo: Send + Sync {
    async fn create(&self, new: NewProgress) -> AppResult<Progress>;
    /// Newest `date` first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Progress>>;
    /// Newest `created_at` first.
    async fn recent(&self, limit: i64) -> AppResult<Vec<RecentProgress>>;
}

#[async_trait]
impl ProgressRepo for PgStore {
    async fn create(&self, new: NewProgress) -> AppResult<Progress> {
        let row = sqlx::query_as::<_, Progress>(
            r#"
            INSERT INTO progress (user_id, added_by, date, status, timing, lesson,
                                  performance, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, added_by, date, status, timing, lesson,
                      performance, remarks, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.added_by)
        .bind(new.date)
        .bind(new.status)
        .bind(&new.timing)
        .bind(&new.lesson)
        .bind(new.performance)
        .bind(&new.remarks)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Progress>> {
        let rows = sqlx::query_as::<_, Progress>(
            r#"
            SELECT id, user_id, added_by, date, status, timing, lesson,
                   performance, remarks, created_at
            FROM progress
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<RecentProgress>> {
        let rows = sqlx::query_as::<_, RecentProgress>(
            r#"
            SELECT p.id, p.user_id, p.added_by, p.date, p.status, p.timing, p.lesson,
                   p.performance, p.remarks, p.created_at,
                   u.name AS user_name, u.email AS user_email
            FROM progress p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
