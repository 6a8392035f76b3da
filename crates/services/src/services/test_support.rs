use chrono::Duration;
use db::DBService;
use sqlx::SqlitePool;

use super::auth::AuthService;

pub async fn pool() -> SqlitePool {
    DBService::new_in_memory().await.unwrap().pool
}

/// Minimum bcrypt cost so tests do not spend their time hashing.
pub fn auth() -> AuthService {
    AuthService::with_password_cost("test-secret", Duration::hours(1), 4)
}

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
