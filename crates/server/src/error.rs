use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, database_validator::DatabaseValidationError, kanban::KanbanError,
    social::SocialError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Kanban(#[from] KanbanError),
    #[error(transparent)]
    Social(#[from] SocialError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Invalid token")]
    InvalidToken,
    #[error("{0}")]
    BadRequest(String),
}

const DATABASE_ERROR: &str = "Database error";

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::MissingFields | AuthError::AlreadyExists | AuthError::UserNotFound => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                AuthError::InvalidPassword => (StatusCode::UNAUTHORIZED, err.to_string()),
                AuthError::Token(_) => (StatusCode::FORBIDDEN, "Invalid token".to_string()),
                AuthError::Database(_) => internal(err, DATABASE_ERROR),
                AuthError::Hashing | AuthError::Password(_) => {
                    internal(err, "Internal server error")
                }
            },
            ApiError::Kanban(err) => match err {
                KanbanError::WorkspaceNotFound
                | KanbanError::ProjectNotFound
                | KanbanError::ListNotFound
                | KanbanError::TaskNotFound => (StatusCode::NOT_FOUND, capitalize(err)),
                KanbanError::Forbidden => (StatusCode::FORBIDDEN, capitalize(err)),
                KanbanError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                KanbanError::Database(_) => internal(err, DATABASE_ERROR),
            },
            ApiError::Social(err) => match err {
                SocialError::PostNotFound | SocialError::UserNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                SocialError::NotPostOwner => (StatusCode::FORBIDDEN, err.to_string()),
                SocialError::AlreadyFollowing
                | SocialError::SelfFollow
                | SocialError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                SocialError::Database(_) => internal(err, DATABASE_ERROR),
            },
            ApiError::DatabaseValidation(err) => internal(err, DATABASE_ERROR),
            ApiError::Database(err) => internal(err, DATABASE_ERROR),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::InvalidToken => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

/// Logs the underlying error and hides it behind a generic message.
fn internal(err: &dyn std::error::Error, message: &str) -> (StatusCode, String) {
    tracing::error!("{}: {}", message, err);
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

fn capitalize(err: &dyn std::fmt::Display) -> String {
    let text = err.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, message) = self.status_and_message();
        let response = ApiResponse::<()>::error(&message);
        (status_code, Json(response)).into_response()
    }
}
