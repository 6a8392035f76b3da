use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64, // Recipient
    pub actor_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub entity_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct NotificationWithActor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub notification: Notification,
    pub actor_username: String,
    pub actor_name: Option<String>,
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, actor_id, type, entity_id, is_read, created_at";

impl Notification {
    /// Inserts a notification for `user_id`. Actions on one's own content
    /// produce nothing and return `None`.
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        actor_id: i64,
        kind: NotificationType,
        entity_id: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        if user_id == actor_id {
            return Ok(None);
        }
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (user_id, actor_id, type, entity_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(actor_id)
        .bind(kind)
        .bind(entity_id)
        .fetch_one(pool)
        .await
        .map(Some)
    }

    /// Newest first, with the actor's name attached.
    pub async fn find_recent(
        pool: &SqlitePool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<NotificationWithActor>, sqlx::Error> {
        sqlx::query_as::<_, NotificationWithActor>(
            r#"SELECT n.id, n.user_id, n.actor_id, n.type, n.entity_id, n.is_read, n.created_at,
                      u.username  AS actor_username,
                      u.full_name AS actor_name
                 FROM notifications n
                 JOIN users u ON u.id = n.actor_id
                WHERE n.user_id = $1
                ORDER BY n.created_at DESC, n.id DESC
                LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Drops like/comment notifications that point at a post.
    pub async fn delete_for_post<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE entity_id = $1 AND type IN ('like', 'comment')",
        )
        .bind(post_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support;

    #[tokio::test]
    async fn self_actions_do_not_notify() {
        let pool = test_support::pool().await;
        let me = test_support::user(&pool, "me").await;
        let created = Notification::create(&pool, me, me, NotificationType::Like, Some(1))
            .await
            .unwrap();
        assert!(created.is_none());
        assert_eq!(Notification::unread_count(&pool, me).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_count_reaches_zero_after_mark_all_read() {
        let pool = test_support::pool().await;
        let me = test_support::user(&pool, "me").await;
        let fan = test_support::user(&pool, "fan").await;
        Notification::create(&pool, me, fan, NotificationType::Follow, None)
            .await
            .unwrap();
        Notification::create(&pool, me, fan, NotificationType::Like, Some(9))
            .await
            .unwrap();
        assert_eq!(Notification::unread_count(&pool, me).await.unwrap(), 2);

        assert_eq!(Notification::mark_all_read(&pool, me).await.unwrap(), 2);
        assert_eq!(Notification::unread_count(&pool, me).await.unwrap(), 0);

        let recent = Notification::find_recent(&pool, me, 20).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].notification.kind, NotificationType::Like);
        assert_eq!(recent[0].actor_username, "fan");
        assert!(recent.iter().all(|n| n.notification.is_read));
    }
}
