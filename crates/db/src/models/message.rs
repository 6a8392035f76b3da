use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SendMessage {
    pub receiver_id: i64,
    pub content: String,
}

/// One row per chat partner with the latest message exchanged.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Conversation {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub last_message: String,
    pub time: DateTime<Utc>,
}

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, content, is_read, created_at";

impl Message {
    pub async fn create(
        pool: &SqlitePool,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (sender_id, receiver_id, content)
             VALUES ($1, $2, $3)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    /// Both directions between two users, oldest first.
    pub async fn find_thread(
        pool: &SqlitePool,
        user_id: i64,
        other_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS}
               FROM messages
              WHERE (sender_id = $1 AND receiver_id = $2)
                 OR (sender_id = $2 AND receiver_id = $1)
              ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .bind(other_id)
        .fetch_all(pool)
        .await
    }

    /// Marks everything `sender_id` sent to `receiver_id` as read.
    pub async fn mark_read_from(
        pool: &SqlitePool,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE sender_id = $1 AND receiver_id = $2 AND is_read = 0",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &SqlitePool, receiver_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = 0",
        )
        .bind(receiver_id)
        .fetch_one(pool)
        .await
    }

    /// Latest message per partner, most recent conversation first.
    pub async fn find_conversations(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"SELECT u.id, u.username, u.full_name,
                      m.content    AS last_message,
                      m.created_at AS time
                 FROM (SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS partner_id,
                              MAX(id) AS last_id
                         FROM messages
                        WHERE sender_id = $1 OR receiver_id = $1
                        GROUP BY partner_id) c
                 JOIN messages m ON m.id = c.last_id
                 JOIN users u ON u.id = c.partner_id
                ORDER BY m.created_at DESC, m.id DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
