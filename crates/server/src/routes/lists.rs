use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::NaiveDate;
use db::models::task::{CreateTask, Task, TaskPriority};
use serde::{Deserialize, Serialize};
use services::services::kanban::KanbanService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

/// Body of `POST /lists/{id}/tasks`; the list comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTaskInList {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = KanbanService::list_tasks(&state.db().pool, list_id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateTaskInList>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let data = CreateTask {
        list_id,
        title: payload.title,
        description: payload.description,
        priority: payload.priority,
        due_date: payload.due_date,
    };
    let task = KanbanService::create_task(&state.db().pool, user.id, &data).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/lists/{id}/tasks", get(get_tasks).post(create_task))
}
