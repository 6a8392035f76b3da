use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::{
    comment::{Comment, CommentWithAuthor, CreateComment},
    post::{CreatePost, Post, PostWithStats},
};
use services::services::social::{LikeToggle, SocialService};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

/// All posts, newest first, with counts from the caller's point of view.
pub async fn get_feed(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<PostWithStats>>>, ApiError> {
    let posts = SocialService::feed(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    axum::Json(payload): axum::Json<CreatePost>,
) -> Result<ResponseJson<ApiResponse<Post>>, ApiError> {
    let post = SocialService::create_post(&state.db().pool, user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<LikeToggle>>, ApiError> {
    let toggle = SocialService::toggle_like(&state.db().pool, user.id, post_id).await?;
    Ok(ResponseJson(ApiResponse::success(toggle)))
}

pub async fn get_comments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<CommentWithAuthor>>>, ApiError> {
    let comments = SocialService::comments(&state.db().pool, post_id).await?;
    Ok(ResponseJson(ApiResponse::success(comments)))
}

pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
    axum::Json(payload): axum::Json<CreateComment>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let comment =
        SocialService::add_comment(&state.db().pool, user.id, post_id, &payload.content).await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    SocialService::delete_post(&state.db().pool, user.id, post_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", get(get_feed).post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .route("/posts/{id}/like", post(toggle_like))
        .route("/posts/{id}/comments", get(get_comments).post(add_comment))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{app, call, register};

    #[tokio::test]
    async fn post_like_comment_and_delete() {
        let (app, _) = app().await;
        let author = register(&app, "author").await;
        let reader = register(&app, "reader").await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/posts",
            Some(&author),
            Some(json!({ "content": "first post", "location": "Lisbon" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_i64().unwrap();

        let like_uri = format!("/api/posts/{id}/like");
        let (_, body) = call(&app, "POST", &like_uri, Some(&reader), None).await;
        assert_eq!(body["data"]["liked"], true);

        let comments_uri = format!("/api/posts/{id}/comments");
        let (status, _) = call(
            &app,
            "POST",
            &comments_uri,
            Some(&reader),
            Some(json!({ "content": "nice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, "GET", "/api/posts", Some(&reader), None).await;
        let post = &body["data"][0];
        assert_eq!(post["username"], "author");
        assert_eq!(post["likes_count"], 1);
        assert_eq!(post["comments_count"], 1);
        assert_eq!(post["user_liked"], true);

        let (_, body) = call(&app, "GET", &comments_uri, Some(&author), None).await;
        assert_eq!(body["data"][0]["username"], "reader");

        let post_uri = format!("/api/posts/{id}");
        let (status, body) = call(&app, "DELETE", &post_uri, Some(&reader), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Unauthorized or post not found");

        let (status, _) = call(&app, "DELETE", &post_uri, Some(&author), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, "GET", "/api/posts", Some(&author), None).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn liking_a_missing_post_is_404() {
        let (app, _) = app().await;
        let token = register(&app, "lonely").await;
        let (status, body) = call(&app, "POST", "/api/posts/99/like", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Post not found");
    }
}
