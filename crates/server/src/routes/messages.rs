use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::message::{Conversation, Message, SendMessage};
use services::services::social::SocialService;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

pub async fn get_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Conversation>>>, ApiError> {
    let conversations = SocialService::conversations(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(conversations)))
}

/// Thread with another user, oldest first. Their messages to the caller are
/// marked read.
pub async fn get_thread(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(other_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Message>>>, ApiError> {
    let thread = SocialService::read_thread(&state.db().pool, user.id, other_id).await?;
    Ok(ResponseJson(ApiResponse::success(thread)))
}

pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    axum::Json(payload): axum::Json<SendMessage>,
) -> Result<ResponseJson<ApiResponse<Message>>, ApiError> {
    let message = SocialService::send_message(&state.db().pool, user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(message)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message))
        .route("/messages/conversations", get(get_conversations))
        .route("/messages/{user_id}", get(get_thread))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{app, call, register};

    #[tokio::test]
    async fn messages_flow_and_unread_counts() {
        let (app, _) = app().await;
        let alice = register(&app, "alice").await;
        let bob = register(&app, "bob").await;

        let (_, me) = call(&app, "GET", "/api/auth/me", Some(&bob), None).await;
        let bob_id = me["data"]["id"].as_i64().unwrap();

        let (status, body) = call(
            &app,
            "POST",
            "/api/messages",
            Some(&alice),
            Some(json!({ "receiver_id": bob_id, "content": "hey bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let alice_id = body["data"]["sender_id"].as_i64().unwrap();
        assert_eq!(body["data"]["is_read"], false);

        let (_, body) = call(
            &app,
            "GET",
            "/api/notifications/unread-count",
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(body["data"], json!({ "notifications": 0, "messages": 1 }));

        let (_, body) = call(&app, "GET", "/api/messages/conversations", Some(&bob), None).await;
        assert_eq!(body["data"][0]["username"], "alice");
        assert_eq!(body["data"][0]["last_message"], "hey bob");

        let thread_uri = format!("/api/messages/{alice_id}");
        let (_, body) = call(&app, "GET", &thread_uri, Some(&bob), None).await;
        assert_eq!(body["data"][0]["content"], "hey bob");
        assert_eq!(body["data"][0]["is_read"], true);

        let (_, body) = call(
            &app,
            "GET",
            "/api/notifications/unread-count",
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(body["data"]["messages"], 0);
    }

    #[tokio::test]
    async fn messaging_an_unknown_user_is_404() {
        let (app, _) = app().await;
        let token = register(&app, "sender").await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/messages",
            Some(&token),
            Some(json!({ "receiver_id": 4242, "content": "anyone?" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
