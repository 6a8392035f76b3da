use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// Public view of an account. The password hash never leaves the db layer
/// except through [`UserWithPassword`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

/// `/auth/me` payload: the account plus derived counts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct UserProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub user: User,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

impl std::ops::Deref for UserProfile {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
}

/// A follow suggestion; `initial` is the first letter of the username.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct UserSuggestion {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub initial: String,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

const USER_COLUMNS: &str = "id, username, email, full_name, bio, image_url, created_at";

impl User {
    /// Fails with a unique violation when the username or email is taken.
    pub async fn create(pool: &SqlitePool, data: &NewUser<'_>) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password, full_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.full_name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Looks an account up by email or username.
    pub async fn find_by_login(
        pool: &SqlitePool,
        login: &str,
    ) -> Result<Option<UserWithPassword>, sqlx::Error> {
        sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password
               FROM users
              WHERE email = $1 OR username = $1
              ORDER BY id
              LIMIT 1"
        ))
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn find_profile(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT u.id, u.username, u.email, u.full_name, u.bio, u.image_url, u.created_at,
                      (SELECT COUNT(*) FROM posts WHERE user_id = u.id)          AS posts_count,
                      (SELECT COUNT(*) FROM followers WHERE following_id = u.id) AS followers_count,
                      (SELECT COUNT(*) FROM followers WHERE follower_id = u.id)  AS following_count
                 FROM users u
                WHERE u.id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Substring match on username or full name.
    pub async fn search(
        pool: &SqlitePool,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let pattern = format!("%{}%", query);
        sqlx::query_as::<_, UserSummary>(
            r#"SELECT id, username, full_name, image_url
                 FROM users
                WHERE username LIKE $1 OR full_name LIKE $1
                ORDER BY username
                LIMIT $2"#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Random accounts that are neither `user_id` nor already followed by it.
    pub async fn suggestions(
        pool: &SqlitePool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<UserSuggestion>, sqlx::Error> {
        sqlx::query_as::<_, UserSuggestion>(
            r#"SELECT id, username, full_name, substr(username, 1, 1) AS initial
                 FROM users
                WHERE id != $1
                  AND id NOT IN (SELECT following_id FROM followers WHERE follower_id = $1)
                ORDER BY random()
                LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Overwrites full name and bio. Returns false when the user is gone.
    pub async fn update_profile(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateProfile,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET full_name = $2, bio = $3 WHERE id = $1")
            .bind(id)
            .bind(&data.full_name)
            .bind(&data.bio)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{follower::Follower, is_unique_violation, test_support};

    fn new_user<'a>(username: &'a str, email: &'a str) -> NewUser<'a> {
        NewUser {
            username,
            email,
            password_hash: "hash",
            full_name: Some("Test User"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_or_username_is_a_unique_violation() {
        let pool = test_support::pool().await;
        User::create(&pool, &new_user("ada", "ada@example.com"))
            .await
            .unwrap();

        let same_email = User::create(&pool, &new_user("ada2", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&same_email));

        let same_name = User::create(&pool, &new_user("ada", "other@example.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&same_name));

        assert_eq!(User::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_matches_email_or_username() {
        let pool = test_support::pool().await;
        let user = User::create(&pool, &new_user("grace", "grace@example.com"))
            .await
            .unwrap();

        let by_email = User::find_by_login(&pool, "grace@example.com")
            .await
            .unwrap()
            .unwrap();
        let by_name = User::find_by_login(&pool, "grace").await.unwrap().unwrap();
        assert_eq!(by_email.user, user);
        assert_eq!(by_name.user, user);
        assert_eq!(by_name.password, "hash");
        assert!(User::find_by_login(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_counts_follows() {
        let pool = test_support::pool().await;
        let a = test_support::user(&pool, "a").await;
        let b = test_support::user(&pool, "b").await;
        let c = test_support::user(&pool, "c").await;
        Follower::create(&pool, b, a).await.unwrap();
        Follower::create(&pool, c, a).await.unwrap();
        Follower::create(&pool, a, b).await.unwrap();

        let profile = User::find_profile(&pool, a).await.unwrap().unwrap();
        assert_eq!(profile.followers_count, 2);
        assert_eq!(profile.following_count, 1);
        assert_eq!(profile.posts_count, 0);
        assert_eq!(profile.username, "a");
    }

    #[tokio::test]
    async fn suggestions_skip_self_and_followed() {
        let pool = test_support::pool().await;
        let me = test_support::user(&pool, "me").await;
        let followed = test_support::user(&pool, "followed").await;
        let stranger = test_support::user(&pool, "stranger").await;
        Follower::create(&pool, me, followed).await.unwrap();

        let suggestions = User::suggestions(&pool, me, 10).await.unwrap();
        let ids: Vec<i64> = suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![stranger]);
        assert_eq!(suggestions[0].initial, "s");
    }

    #[tokio::test]
    async fn search_matches_substrings() {
        let pool = test_support::pool().await;
        test_support::user(&pool, "alice").await;
        test_support::user(&pool, "malik").await;
        test_support::user(&pool, "bob").await;

        let found = User::search(&pool, "li", 10).await.unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "malik"]);
    }
}
