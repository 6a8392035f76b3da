use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feed entry: the post, its author and counts relative to the viewer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PostWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub post: Post,
    pub username: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub user_liked: bool,
}

impl std::ops::Deref for PostWithStats {
    type Target = Post;
    fn deref(&self) -> &Self::Target {
        &self.post
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreatePost {
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

const POST_COLUMNS: &str = "id, user_id, content, image_url, location, created_at";

impl Post {
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        data: &CreatePost,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (user_id, content, image_url, location)
             VALUES ($1, $2, $3, $4)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&data.content)
        .bind(&data.image_url)
        .bind(&data.location)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every post, newest first, as seen by `viewer_id`.
    pub async fn find_feed(
        pool: &SqlitePool,
        viewer_id: i64,
    ) -> Result<Vec<PostWithStats>, sqlx::Error> {
        sqlx::query_as::<_, PostWithStats>(
            r#"SELECT p.id, p.user_id, p.content, p.image_url, p.location, p.created_at,
                      u.username,
                      (SELECT COUNT(*) FROM likes WHERE post_id = p.id)    AS likes_count,
                      (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comments_count,
                      EXISTS(SELECT 1 FROM likes WHERE post_id = p.id AND user_id = $1) AS user_liked
                 FROM posts p
                 JOIN users u ON u.id = p.user_id
                ORDER BY p.created_at DESC, p.id DESC"#,
        )
        .bind(viewer_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes the post only when `user_id` authored it.
    pub async fn delete_owned<'e, E>(executor: E, id: i64, user_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
