use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Kind of entity an activity entry refers to
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "entity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityType {
    Workspace,
    Project,
}

/// Workspace activity log entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Activity {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: i64,
    pub action: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

const ACTIVITY_COLUMNS: &str =
    "id, workspace_id, user_id, action, entity_type, entity_id, metadata, created_at";

impl Activity {
    pub async fn create<'e, E>(
        executor: E,
        workspace_id: Uuid,
        user_id: i64,
        action: &str,
        entity_type: EntityType,
        entity_id: Uuid,
        metadata: serde_json::Value,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Activity>(&format!(
            "INSERT INTO activities (id, workspace_id, user_id, action, entity_type, entity_id, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(workspace_id)
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(Json(metadata))
        .fetch_one(executor)
        .await
    }

    /// Most recent entries first.
    pub async fn find_by_workspace_id(
        pool: &SqlitePool,
        workspace_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS}
               FROM activities
              WHERE workspace_id = $1
              ORDER BY created_at DESC, rowid DESC
              LIMIT $2"
        ))
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
