use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub comment: Comment,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateComment {
    pub content: String,
}

impl Comment {
    pub async fn create(
        pool: &SqlitePool,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"INSERT INTO comments (post_id, user_id, content)
               VALUES ($1, $2, $3)
               RETURNING id, post_id, user_id, content, created_at"#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    /// Comments of a post, oldest first.
    pub async fn find_by_post_id(
        pool: &SqlitePool,
        post_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, u.username
                 FROM comments c
                 JOIN users u ON u.id = c.user_id
                WHERE c.post_id = $1
                ORDER BY c.created_at ASC, c.id ASC"#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_by_post_id<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
