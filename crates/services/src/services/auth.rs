//! Registration, login and bearer-token issuance.

use chrono::Duration;
use db::models::{
    is_unique_violation,
    user::{NewUser, User, UserProfile},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use utils::{
    jwt::{Claims, TokenError, TokenSigner},
    password,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("Missing fields")]
    MissingFields,
    #[error("Username or email already exists")]
    AlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("password hashing task failed")]
    Hashing,
    #[error("password hashing failed: {0}")]
    Password(#[from] password::BcryptError),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "fullName")]
    pub full_name: Option<String>,
}

/// `email` accepts either the email address or the username.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Owns the token signing secret and the password hashing cost.
#[derive(Clone)]
pub struct AuthService {
    signer: TokenSigner,
    password_cost: u32,
}

impl AuthService {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self::with_password_cost(secret, token_ttl, password::DEFAULT_COST)
    }

    /// `cost` is the bcrypt work factor, clamped to 4..=31.
    pub fn with_password_cost(secret: &str, token_ttl: Duration, cost: u32) -> Self {
        Self {
            signer: TokenSigner::new(secret, token_ttl),
            password_cost: cost.clamp(password::MIN_COST, password::MAX_COST),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.signer.verify(token)?)
    }

    pub async fn register(
        &self,
        pool: &SqlitePool,
        request: RegisterRequest,
    ) -> Result<AuthSession, AuthError> {
        let email = request.email.trim();
        let username = request.username.trim();
        if email.is_empty() || username.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let password_hash = self.hash(request.password).await?;
        let full_name = request
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let user = User::create(
            pool,
            &NewUser {
                username,
                email,
                password_hash: &password_hash,
                full_name,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::AlreadyExists
            } else {
                AuthError::Database(e)
            }
        })?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        let token = self.signer.issue(user.id, &user.username)?;
        Ok(AuthSession { token, user })
    }

    pub async fn login(
        &self,
        pool: &SqlitePool,
        request: LoginRequest,
    ) -> Result<AuthSession, AuthError> {
        let login = request.email.trim();
        if login.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let record = User::find_by_login(pool, login)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let stored = record.password.clone();
        let password = request.password;
        let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
            .await
            .map_err(|_| AuthError::Hashing)?;
        if !valid {
            debug!(user_id = record.user.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidPassword);
        }

        let token = self.signer.issue(record.user.id, &record.user.username)?;
        Ok(AuthSession {
            token,
            user: record.user,
        })
    }

    pub async fn me(pool: &SqlitePool, user_id: i64) -> Result<UserProfile, AuthError> {
        User::find_profile(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.password_cost;
        let hashed = tokio::task::spawn_blocking(move || password::hash_with_cost(&password, cost))
            .await
            .map_err(|_| AuthError::Hashing)??;
        Ok(hashed)
    }
}
