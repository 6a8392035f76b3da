//! Workspace, project, list and task operations for the Kanban board.

use db::models::{
    activity::{Activity, EntityType},
    is_foreign_key_violation,
    list::{DEFAULT_LISTS, List},
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, UpdateTask},
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::board::{BoardSnapshot, BoardView};

const ACTIVITY_PAGE_SIZE: i64 = 50;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("workspace not found")]
    WorkspaceNotFound,
    #[error("project not found")]
    ProjectNotFound,
    #[error("list not found")]
    ListNotFound,
    #[error("task not found")]
    TaskNotFound,
    #[error("workspace belongs to another user")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
}

fn require_name(value: &str, what: &str) -> Result<(), KanbanError> {
    if value.trim().is_empty() {
        return Err(KanbanError::Validation(format!("{what} is required")));
    }
    Ok(())
}

pub struct KanbanService;

impl KanbanService {
    /// Loads a workspace and checks that `user_id` owns it.
    pub async fn owned_workspace(
        pool: &SqlitePool,
        workspace_id: Uuid,
        user_id: i64,
    ) -> Result<Workspace, KanbanError> {
        let workspace = Workspace::find_by_id(pool, workspace_id)
            .await?
            .ok_or(KanbanError::WorkspaceNotFound)?;
        if workspace.owner_id != user_id {
            return Err(KanbanError::Forbidden);
        }
        Ok(workspace)
    }

    pub async fn list_workspaces(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Workspace>, KanbanError> {
        Ok(Workspace::find_by_owner(pool, user_id).await?)
    }

    /// Creates the workspace and its `created` activity entry atomically.
    pub async fn create_workspace(
        pool: &SqlitePool,
        user_id: i64,
        data: &CreateWorkspace,
    ) -> Result<Workspace, KanbanError> {
        require_name(&data.name, "Workspace name")?;

        let mut tx = pool.begin().await?;
        let workspace = Workspace::create(&mut *tx, data, user_id, Uuid::new_v4()).await?;
        Activity::create(
            &mut *tx,
            workspace.id,
            user_id,
            "created",
            EntityType::Workspace,
            workspace.id,
            serde_json::json!({ "name": data.name }),
        )
        .await?;
        tx.commit().await?;

        info!(workspace_id = %workspace.id, user_id, "Created workspace");
        Ok(workspace)
    }

    pub async fn update_workspace(
        pool: &SqlitePool,
        user_id: i64,
        workspace_id: Uuid,
        data: &UpdateWorkspace,
    ) -> Result<Workspace, KanbanError> {
        if let Some(name) = &data.name {
            require_name(name, "Workspace name")?;
        }
        Self::owned_workspace(pool, workspace_id, user_id).await?;
        Workspace::update(pool, workspace_id, data)
            .await?
            .ok_or(KanbanError::WorkspaceNotFound)
    }

    pub async fn delete_workspace(
        pool: &SqlitePool,
        user_id: i64,
        workspace_id: Uuid,
    ) -> Result<(), KanbanError> {
        Self::owned_workspace(pool, workspace_id, user_id).await?;
        if Workspace::delete(pool, workspace_id).await? == 0 {
            return Err(KanbanError::WorkspaceNotFound);
        }
        info!(workspace_id = %workspace_id, "Deleted workspace");
        Ok(())
    }

    pub async fn list_projects(
        pool: &SqlitePool,
        user_id: i64,
        workspace_id: Uuid,
    ) -> Result<Vec<Project>, KanbanError> {
        Self::owned_workspace(pool, workspace_id, user_id).await?;
        Ok(Project::find_by_workspace_id(pool, workspace_id).await?)
    }

    pub async fn get_project(pool: &SqlitePool, project_id: Uuid) -> Result<Project, KanbanError> {
        Project::find_by_id(pool, project_id)
            .await?
            .ok_or(KanbanError::ProjectNotFound)
    }

    /// Creates a project with the default `To Do` / `In Progress` / `Done`
    /// columns and logs the creation, all in one transaction.
    pub async fn create_project(
        pool: &SqlitePool,
        user_id: i64,
        workspace_id: Uuid,
        data: &CreateProject,
    ) -> Result<Project, KanbanError> {
        require_name(&data.name, "Project name")?;
        Self::owned_workspace(pool, workspace_id, user_id).await?;

        let mut tx = pool.begin().await?;
        let project =
            Project::create(&mut *tx, data, workspace_id, user_id, Uuid::new_v4()).await?;
        for name in DEFAULT_LISTS {
            List::create(&mut *tx, project.id, name, Uuid::new_v4()).await?;
        }
        Activity::create(
            &mut *tx,
            workspace_id,
            user_id,
            "created",
            EntityType::Project,
            project.id,
            serde_json::json!({ "name": data.name }),
        )
        .await?;
        tx.commit().await?;

        info!(project_id = %project.id, workspace_id = %workspace_id, "Created project");
        Ok(project)
    }

    pub async fn update_project(
        pool: &SqlitePool,
        project_id: Uuid,
        data: &UpdateProject,
    ) -> Result<Project, KanbanError> {
        if let Some(name) = &data.name {
            require_name(name, "Project name")?;
        }
        Project::update(pool, project_id, data)
            .await?
            .ok_or(KanbanError::ProjectNotFound)
    }

    pub async fn delete_project(pool: &SqlitePool, project_id: Uuid) -> Result<(), KanbanError> {
        if Project::delete(pool, project_id).await? == 0 {
            return Err(KanbanError::ProjectNotFound);
        }
        info!(project_id = %project_id, "Deleted project");
        Ok(())
    }

    pub async fn list_lists(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<List>, KanbanError> {
        Ok(List::find_by_project_id(pool, project_id).await?)
    }

    pub async fn create_list(
        pool: &SqlitePool,
        project_id: Uuid,
        name: &str,
    ) -> Result<List, KanbanError> {
        require_name(name, "List name")?;
        Self::get_project(pool, project_id).await?;
        Ok(List::create(pool, project_id, name.trim(), Uuid::new_v4()).await?)
    }

    pub async fn get_task(pool: &SqlitePool, task_id: Uuid) -> Result<Task, KanbanError> {
        Task::find_by_id(pool, task_id)
            .await?
            .ok_or(KanbanError::TaskNotFound)
    }

    pub async fn list_tasks(pool: &SqlitePool, list_id: Uuid) -> Result<Vec<Task>, KanbanError> {
        Ok(Task::find_by_list_id(pool, list_id).await?)
    }

    /// Appends a task to the end of its list.
    pub async fn create_task(
        pool: &SqlitePool,
        user_id: i64,
        data: &CreateTask,
    ) -> Result<Task, KanbanError> {
        require_name(&data.title, "Task title")?;
        if !List::exists(pool, data.list_id).await? {
            return Err(KanbanError::ListNotFound);
        }
        let task = Task::create(pool, data, user_id, Uuid::new_v4()).await?;
        debug!(task_id = %task.id, list_id = %task.list_id, position = task.position, "Created task");
        Ok(task)
    }

    pub async fn update_task(
        pool: &SqlitePool,
        task_id: Uuid,
        data: &UpdateTask,
    ) -> Result<Task, KanbanError> {
        if let Some(title) = &data.title {
            require_name(title, "Task title")?;
        }
        if let Some(list_id) = data.list_id {
            if !List::exists(pool, list_id).await? {
                return Err(KanbanError::ListNotFound);
            }
        }
        Task::update(pool, task_id, data)
            .await?
            .ok_or(KanbanError::TaskNotFound)
    }

    /// Deletes a task without renumbering its former siblings.
    pub async fn delete_task(pool: &SqlitePool, task_id: Uuid) -> Result<(), KanbanError> {
        if Task::delete(pool, task_id).await? == 0 {
            return Err(KanbanError::TaskNotFound);
        }
        Ok(())
    }

    /// Moves a task into `list_id` at `position` and returns the updated row.
    ///
    /// The position is taken as given: it is not bounds-checked and no other
    /// task is renumbered, so callers that do not append can create
    /// duplicate positions.
    pub async fn move_task(
        pool: &SqlitePool,
        task_id: Uuid,
        list_id: Uuid,
        position: i64,
    ) -> Result<Task, KanbanError> {
        if !List::exists(pool, list_id).await? {
            return Err(KanbanError::ListNotFound);
        }
        let task = Task::move_to_list(pool, task_id, list_id, position)
            .await
            .map_err(|e| {
                // The list can vanish between the check and the write.
                if is_foreign_key_violation(&e) {
                    KanbanError::ListNotFound
                } else {
                    KanbanError::Database(e)
                }
            })?
            .ok_or(KanbanError::TaskNotFound)?;

        debug!(task_id = %task.id, list_id = %list_id, position, "Moved task");
        Ok(task)
    }

    pub async fn board(pool: &SqlitePool, project_id: Uuid) -> Result<BoardSnapshot, KanbanError> {
        Self::get_project(pool, project_id).await?;
        Ok(BoardView::load(pool, project_id).await?.snapshot())
    }

    pub async fn activities(
        pool: &SqlitePool,
        user_id: i64,
        workspace_id: Uuid,
    ) -> Result<Vec<Activity>, KanbanError> {
        Self::owned_workspace(pool, workspace_id, user_id).await?;
        Ok(Activity::find_by_workspace_id(pool, workspace_id, ACTIVITY_PAGE_SIZE).await?)
    }
}
