use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::notification::NotificationWithActor;
use services::services::social::{SocialService, UnreadCounts};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

/// Marks every notification read and returns the newest ones.
pub async fn get_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<NotificationWithActor>>>, ApiError> {
    let notifications = SocialService::read_notifications(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(notifications)))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<UnreadCounts>>, ApiError> {
    let counts = SocialService::unread_counts(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(counts)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/notifications", get(get_notifications))
        .route("/notifications/unread-count", get(get_unread_count))
}
