use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A board column. `position` orders lists within their project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct List {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateList {
    pub name: String,
}

/// Columns every new project starts with, in board order.
pub const DEFAULT_LISTS: [&str; 3] = ["To Do", "In Progress", "Done"];

const LIST_COLUMNS: &str = "id, project_id, name, position, created_at, updated_at";

impl List {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, List>(&format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM lists WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, List>(&format!(
            "SELECT {LIST_COLUMNS}
               FROM lists
              WHERE project_id = $1
              ORDER BY position ASC, created_at ASC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Appends a list after the project's current last column.
    pub async fn create<'e, E>(
        executor: E,
        project_id: Uuid,
        name: &str,
        list_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, List>(&format!(
            "INSERT INTO lists (id, project_id, name, position)
             VALUES ($1, $2, $3,
                     (SELECT COALESCE(MAX(position) + 1, 0) FROM lists WHERE project_id = $2))
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(list_id)
        .bind(project_id)
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Removes a list and, through the foreign key cascade, its tasks.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
