use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::task::{Task, UpdateTask};
use serde::{Deserialize, Serialize};
use services::services::kanban::KanbanService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MoveTask {
    pub list_id: Uuid,
    pub position: i64,
}

pub async fn get_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = KanbanService::get_task(&state.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = KanbanService::update_task(&state.db().pool, task_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    KanbanService::delete_task(&state.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Re-homes a task. The position is stored as sent; siblings are untouched.
pub async fn move_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<MoveTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task =
        KanbanService::move_task(&state.db().pool, task_id, payload.list_id, payload.position)
            .await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/move", post(move_task))
}
