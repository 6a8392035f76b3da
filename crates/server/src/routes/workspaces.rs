use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    activity::Activity,
    project::{CreateProject, Project},
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};
use services::services::kanban::KanbanService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

pub async fn get_workspaces(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Workspace>>>, ApiError> {
    let workspaces = KanbanService::list_workspaces(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(workspaces)))
}

pub async fn create_workspace(
    State(state): State<AppState>,
    user: CurrentUser,
    axum::Json(payload): axum::Json<CreateWorkspace>,
) -> Result<ResponseJson<ApiResponse<Workspace>>, ApiError> {
    let workspace = KanbanService::create_workspace(&state.db().pool, user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(workspace)))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Workspace>>, ApiError> {
    let workspace =
        KanbanService::owned_workspace(&state.db().pool, workspace_id, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(workspace)))
}

pub async fn update_workspace(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateWorkspace>,
) -> Result<ResponseJson<ApiResponse<Workspace>>, ApiError> {
    let workspace =
        KanbanService::update_workspace(&state.db().pool, user.id, workspace_id, &payload)
            .await?;
    Ok(ResponseJson(ApiResponse::success(workspace)))
}

pub async fn delete_workspace(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    KanbanService::delete_workspace(&state.db().pool, user.id, workspace_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_projects(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = KanbanService::list_projects(&state.db().pool, user.id, workspace_id).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// Creates a project with its three default lists.
pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project =
        KanbanService::create_project(&state.db().pool, user.id, workspace_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_activities(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Activity>>>, ApiError> {
    let activities = KanbanService::activities(&state.db().pool, user.id, workspace_id).await?;
    Ok(ResponseJson(ApiResponse::success(activities)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/workspaces", get(get_workspaces).post(create_workspace))
        .route(
            "/workspaces/{id}",
            get(get_workspace)
                .put(update_workspace)
                .delete(delete_workspace),
        )
        .route(
            "/workspaces/{id}/projects",
            get(get_projects).post(create_project),
        )
        .route("/workspaces/{id}/activities", get(get_activities))
}
