use sqlx::{Executor, Sqlite, SqlitePool};

/// A (post, user) pair; at most one per user and post.
pub struct Like;

impl Like {
    pub async fn exists(pool: &SqlitePool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Returns false when the like was already there.
    pub async fn create(pool: &SqlitePool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO likes (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &SqlitePool, post_id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_post(pool: &SqlitePool, post_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete_by_post_id<'e, E>(executor: E, post_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1")
            .bind(post_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
