use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::UserProfile;
use services::services::auth::{AuthService, AuthSession, LoginRequest, RegisterRequest};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

pub async fn register(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<RegisterRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session = state.auth().register(&state.db().pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

/// `email` may hold either the email address or the username.
pub async fn login(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session = state.auth().login(&state.db().pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let profile = AuthService::me(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me)),
    )
}
