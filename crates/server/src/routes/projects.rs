use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    list::{CreateList, List},
    project::{Project, UpdateProject},
};
use services::services::{board::BoardSnapshot, kanban::KanbanService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentUser};

pub async fn get_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = KanbanService::get_project(&state.db().pool, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = KanbanService::update_project(&state.db().pool, project_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    KanbanService::delete_project(&state.db().pool, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_lists(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<List>>>, ApiError> {
    let lists = KanbanService::list_lists(&state.db().pool, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(lists)))
}

pub async fn create_list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateList>,
) -> Result<ResponseJson<ApiResponse<List>>, ApiError> {
    let list = KanbanService::create_list(&state.db().pool, project_id, &payload.name).await?;
    Ok(ResponseJson(ApiResponse::success(list)))
}

/// Lists in board order, each with its tasks in position order.
pub async fn get_board(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BoardSnapshot>>, ApiError> {
    let board = KanbanService::board(&state.db().pool, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/lists", get(get_lists).post(create_list))
        .route("/projects/{id}/board", get(get_board))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{app, call, register};

    #[tokio::test]
    async fn lists_append_and_projects_update() {
        let (app, _) = app().await;
        let token = register(&app, "planner").await;
        let (_, body) = call(
            &app,
            "POST",
            "/api/workspaces",
            Some(&token),
            Some(json!({ "name": "ws" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = call(
            &app,
            "POST",
            &format!("/api/workspaces/{workspace_id}/projects"),
            Some(&token),
            Some(json!({ "name": "roadmap" })),
        )
        .await;
        let uri = format!("/api/projects/{}", body["data"]["id"].as_str().unwrap());

        let (status, body) = call(
            &app,
            "POST",
            &format!("{uri}/lists"),
            Some(&token),
            Some(json!({ "name": "Blocked" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["position"], 3);

        let (status, body) = call(
            &app,
            "POST",
            &format!("{uri}/lists"),
            Some(&token),
            Some(json!({ "name": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "List name is required");

        let (_, body) = call(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "color": "#ef4444" })),
        )
        .await;
        assert_eq!(body["data"]["name"], "roadmap");
        assert_eq!(body["data"]["color"], "#ef4444");

        let (_, body) = call(&app, "GET", &format!("{uri}/board"), Some(&token), None).await;
        let names: Vec<_> = body["data"]["lists"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["To Do", "In Progress", "Done", "Blocked"]);

        let (status, _) = call(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, "GET", &format!("{uri}/board"), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Project not found");
    }
}
