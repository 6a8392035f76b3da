use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Top-level grouping of projects, owned by one user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateWorkspace {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
}

const WORKSPACE_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

impl Workspace {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Workspaces owned by `owner_id`, newest first.
    pub async fn find_by_owner(
        pool: &SqlitePool,
        owner_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {WORKSPACE_COLUMNS}
               FROM workspaces
              WHERE owner_id = $1
              ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        data: &CreateWorkspace,
        owner_id: i64,
        workspace_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let description = data.description.as_deref().filter(|d| !d.is_empty());
        sqlx::query_as::<_, Workspace>(&format!(
            "INSERT INTO workspaces (id, name, description, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {WORKSPACE_COLUMNS}"
        ))
        .bind(workspace_id)
        .bind(&data.name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateWorkspace,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            "UPDATE workspaces
                SET name        = COALESCE($2, name),
                    description = COALESCE($3, description),
                    updated_at  = datetime('now', 'subsec')
              WHERE id = $1
              RETURNING {WORKSPACE_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the workspace and everything under it.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
