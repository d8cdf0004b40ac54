use chrono::Utc;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::Database;
use crate::models::{NewNotification, Notification};

/// Insert a notification through any executor, so workflows can make it the
/// terminal write of an open transaction.
pub async fn insert_notification<'e, E>(
    executor: E,
    notification: &NewNotification,
) -> Result<Notification, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, message, kind, is_read, link, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(notification.user_id)
    .bind(&notification.message)
    .bind(notification.kind)
    .bind(&notification.link)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

impl Database {
    pub async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        insert_notification(self.pool(), notification).await
    }

    pub async fn list_notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
    }

    /// Scoped to the owner so one user cannot touch another's inbox.
    pub async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    pub async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
