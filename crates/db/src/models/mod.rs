pub mod activity;
pub mod comment;
pub mod follower;
pub mod like;
pub mod list;
pub mod message;
pub mod notification;
pub mod post;
pub mod project;
pub mod task;
pub mod user;
pub mod workspace;

/// True when `err` is a UNIQUE constraint violation reported by SQLite.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// True when `err` is a FOREIGN KEY constraint violation reported by SQLite.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    use crate::DBService;

    pub async fn pool() -> SqlitePool {
        DBService::new_in_memory().await.unwrap().pool
    }

    /// Inserts a user directly and returns its id.
    pub async fn user(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, 'x') RETURNING id",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(pool)
        .await
        .unwrap()
    }
}
