use axum::{Router, routing::get};
use utils::response::ApiResponse;

use crate::AppState;

pub mod auth;
pub mod lists;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod workspaces;

async fn health() -> axum::Json<ApiResponse<&'static str>> {
    axum::Json(ApiResponse::success("OK"))
}

/// Every `/api` route, with state attached.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(auth::router(&state))
        .merge(posts::router(&state))
        .merge(users::router(&state))
        .merge(messages::router(&state))
        .merge(notifications::router(&state))
        .merge(workspaces::router(&state))
        .merge(projects::router(&state))
        .merge(lists::router(&state))
        .merge(tasks::router(&state));

    Router::new().nest("/api", api).with_state(state)
}
