use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

const PROJECT_COLUMNS: &str =
    "id, workspace_id, name, description, color, created_by, created_at, updated_at";

impl Project {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Projects of a workspace, newest first.
    pub async fn find_by_workspace_id(
        pool: &SqlitePool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS}
               FROM projects
              WHERE workspace_id = $1
              ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(workspace_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateProject,
        workspace_id: Uuid,
        created_by: i64,
        project_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let color = data
            .color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_PROJECT_COLOR);
        let description = data.description.as_deref().filter(|d| !d.is_empty());
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, workspace_id, name, description, color, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(project_id)
        .bind(workspace_id)
        .bind(&data.name)
        .bind(description)
        .bind(color)
        .bind(created_by)
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects
                SET name        = COALESCE($2, name),
                    description = COALESCE($3, description),
                    color       = COALESCE($4, color),
                    updated_at  = datetime('now', 'subsec')
              WHERE id = $1
              RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.color)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the project together with its lists and tasks.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
