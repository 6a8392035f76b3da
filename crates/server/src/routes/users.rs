use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    follower::Follower,
    user::{UpdateProfile, User, UserSuggestion, UserSummary},
};
use serde::Deserialize;
use services::services::social::SocialService;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn get_suggestions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<UserSuggestion>>>, ApiError> {
    let suggestions = SocialService::suggestions(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(suggestions)))
}

pub async fn search_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = SocialService::search(&state.db().pool, &query.q).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn follow_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(target_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Follower>>, ApiError> {
    let follow = SocialService::follow(&state.db().pool, user.id, target_id).await?;
    Ok(ResponseJson(ApiResponse::success(follow)))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    axum::Json(payload): axum::Json<UpdateProfile>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let updated = SocialService::update_profile(&state.db().pool, user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/suggestions", get(get_suggestions))
        .route("/users/search", get(search_users))
        .route("/users/me", put(update_me))
        .route("/users/{id}/follow", post(follow_user))
}
