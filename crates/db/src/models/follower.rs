use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Follower {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Follower {
    /// Fails with a unique violation when the edge already exists.
    pub async fn create(
        pool: &SqlitePool,
        follower_id: i64,
        following_id: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Follower>(
            r#"INSERT INTO followers (follower_id, following_id)
               VALUES ($1, $2)
               RETURNING id, follower_id, following_id, created_at"#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(pool)
        .await
    }

    pub async fn exists(
        pool: &SqlitePool,
        follower_id: i64,
        following_id: i64,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM followers WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(pool)
        .await
    }
}
