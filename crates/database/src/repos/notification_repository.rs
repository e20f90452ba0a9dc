//! Notification repository for database operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{NewNotification, Notification, NotificationPriority, NotificationType};
use crate::types::DatabaseResult;

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a notification and return its id
    pub async fn create(&self, notification: &NewNotification) -> DatabaseResult<i64> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO notifications (user_id, type, title, message, priority, is_read, created_at) VALUES (?, ?, ?, ?, ?, FALSE, ?)",
        )
        .bind(notification.user_id)
        .bind(notification.notification_type.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.priority.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Newest notifications first
    pub async fn find_by_user_id(&self, user_id: i64, limit: u32) -> DatabaseResult<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, type, title, message, priority, is_read, created_at
             FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let notifications = rows
            .iter()
            .map(map_notification)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(notifications)
    }
}

fn map_notification(row: &SqliteRow) -> Result<Notification, sqlx::Error> {
    let notification_type: String = row.try_get("type")?;
    let priority: String = row.try_get("priority")?;

    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        notification_type: NotificationType::from(notification_type.as_str()),
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        priority: NotificationPriority::from(priority.as_str()),
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}
