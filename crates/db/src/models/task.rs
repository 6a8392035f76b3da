use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::list::List;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A card on the board.
///
/// `position` only orders tasks relative to their siblings in the same list.
/// Positions are not contiguous (deletes leave gaps) and are not guaranteed
/// unique (two concurrent appends can pick the same value).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub list_id: Uuid, // Foreign key to List, changes on move
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i64>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub list_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

impl CreateTask {
    pub fn from_title(list_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            list_id,
            title: title.into(),
            description: None,
            priority: None,
            due_date: None,
        }
    }
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i64>,
    pub list_id: Option<Uuid>,
    pub position: Option<i64>,
}

const TASK_COLUMNS: &str = "id, list_id, title, description, position, priority, due_date, assigned_to, created_by, created_at, updated_at";

impl Task {
    pub async fn parent_list(&self, pool: &SqlitePool) -> Result<Option<List>, sqlx::Error> {
        List::find_by_id(pool, self.list_id).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks of one list in render order.
    pub async fn find_by_list_id(
        pool: &SqlitePool,
        list_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS}
               FROM tasks
              WHERE list_id = $1
              ORDER BY position ASC, created_at ASC, rowid ASC"
        ))
        .bind(list_id)
        .fetch_all(pool)
        .await
    }

    /// Every task on a project's board, ordered by list then position.
    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT t.id, t.list_id, t.title, t.description, t.position, t.priority,
                      t.due_date, t.assigned_to, t.created_by, t.created_at, t.updated_at
                 FROM tasks t
                 JOIN lists l ON l.id = t.list_id
                WHERE l.project_id = $1
                ORDER BY l.position ASC, t.position ASC, t.created_at ASC, t.rowid ASC"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_in_list(pool: &SqlitePool, list_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE list_id = $1")
            .bind(list_id)
            .fetch_one(pool)
            .await
    }

    /// Inserts at the end of the list: max position + 1, or 0 when empty.
    ///
    /// The position is computed inside the INSERT so sequential creates in
    /// one list always get strictly increasing positions.
    pub async fn create<'e, E>(
        executor: E,
        data: &CreateTask,
        created_by: i64,
        task_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let priority = data.priority.unwrap_or_default();
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, list_id, title, description, position, priority, due_date, created_by)
             VALUES ($1, $2, $3, $4,
                     (SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE list_id = $2),
                     $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(data.list_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(priority)
        .bind(data.due_date)
        .bind(created_by)
        .fetch_one(executor)
        .await
    }

    /// Returns `None` when no task has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
                SET title       = COALESCE($2, title),
                    description = COALESCE($3, description),
                    priority    = COALESCE($4, priority),
                    due_date    = COALESCE($5, due_date),
                    assigned_to = COALESCE($6, assigned_to),
                    list_id     = COALESCE($7, list_id),
                    position    = COALESCE($8, position),
                    updated_at  = datetime('now', 'subsec')
              WHERE id = $1
              RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(data.list_id)
        .bind(data.position)
        .fetch_optional(pool)
        .await
    }

    /// Re-homes a task and sets its position. Only this row is written; the
    /// siblings in the source and destination lists keep their positions.
    /// Returns `None` when no task has this id.
    pub async fn move_to_list(
        pool: &SqlitePool,
        id: Uuid,
        list_id: Uuid,
        position: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
                SET list_id = $2, position = $3, updated_at = datetime('now', 'subsec')
              WHERE id = $1
              RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(list_id)
        .bind(position)
        .fetch_optional(pool)
        .await
    }

    /// Deletes one task. Sibling positions are left as they are.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        list::List,
        project::{CreateProject, Project},
        test_support,
        workspace::{CreateWorkspace, Workspace},
    };

    #[test]
    fn priority_parses_lowercase_names() {
        assert_eq!("urgent".parse::<TaskPriority>(), Ok(TaskPriority::Urgent));
        assert_eq!(TaskPriority::High.to_string(), "high");
        assert_eq!(
            "someday".parse::<TaskPriority>(),
            Err(strum::ParseError::VariantNotFound)
        );
    }

    async fn board(pool: &SqlitePool) -> (i64, Uuid, Uuid) {
        let user = test_support::user(pool, "ada").await;
        let workspace = Workspace::create(
            pool,
            &CreateWorkspace {
                name: "Acme".into(),
                description: None,
            },
            user,
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let project = Project::create(
            pool,
            &CreateProject {
                name: "Launch".into(),
                description: None,
                color: None,
            },
            workspace.id,
            user,
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let todo = List::create(pool, project.id, "To Do", Uuid::new_v4())
            .await
            .unwrap();
        let done = List::create(pool, project.id, "Done", Uuid::new_v4())
            .await
            .unwrap();
        (user, todo.id, done.id)
    }

    async fn add(pool: &SqlitePool, list_id: Uuid, user: i64, title: &str) -> Task {
        Task::create(pool, &CreateTask::from_title(list_id, title), user, Uuid::new_v4())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sequential_creates_get_increasing_positions() {
        let pool = test_support::pool().await;
        let (user, todo, _) = board(&pool).await;

        let mut positions = Vec::new();
        for i in 0..5 {
            positions.push(add(&pool, todo, user, &format!("task {i}")).await.position);
        }

        assert_eq!(positions[0], 0);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let listed: Vec<i64> = Task::find_by_list_id(&pool, todo)
            .await
            .unwrap()
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(listed, positions);
    }

    #[tokio::test]
    async fn new_task_defaults_to_medium_priority() {
        let pool = test_support::pool().await;
        let (user, todo, _) = board(&pool).await;
        let task = add(&pool, todo, user, "defaults").await;
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.created_by, user);
        assert!(task.due_date.is_none());
    }

    #[tokio::test]
    async fn move_only_touches_the_moved_row() {
        let pool = test_support::pool().await;
        let (user, todo, done) = board(&pool).await;
        let a = add(&pool, todo, user, "a").await;
        let b = add(&pool, todo, user, "b").await;
        let c = add(&pool, todo, user, "c").await;

        let moved = Task::move_to_list(&pool, b.id, done, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.list_id, done);
        assert_eq!(moved.position, 0);

        let remaining = Task::find_by_list_id(&pool, todo).await.unwrap();
        let ids: Vec<Uuid> = remaining.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert_eq!(remaining[0].position, a.position);
        assert_eq!(remaining[1].position, c.position);
    }

    #[tokio::test]
    async fn move_of_unknown_task_returns_none() {
        let pool = test_support::pool().await;
        let (_, _, done) = board(&pool).await;
        let moved = Task::move_to_list(&pool, Uuid::new_v4(), done, 3)
            .await
            .unwrap();
        assert!(moved.is_none());
    }

    #[tokio::test]
    async fn repeated_moves_can_duplicate_positions() {
        let pool = test_support::pool().await;
        let (user, todo, done) = board(&pool).await;
        let a = add(&pool, todo, user, "a").await;
        let b = add(&pool, todo, user, "b").await;

        Task::move_to_list(&pool, a.id, done, 0).await.unwrap();
        Task::move_to_list(&pool, b.id, done, 0).await.unwrap();

        let in_done = Task::find_by_list_id(&pool, done).await.unwrap();
        assert_eq!(in_done.len(), 2);
        assert!(in_done.iter().all(|t| t.position == 0));
    }

    #[tokio::test]
    async fn delete_leaves_gaps() {
        let pool = test_support::pool().await;
        let (user, todo, _) = board(&pool).await;
        let _a = add(&pool, todo, user, "a").await;
        let b = add(&pool, todo, user, "b").await;
        let _c = add(&pool, todo, user, "c").await;

        assert_eq!(Task::delete(&pool, b.id).await.unwrap(), 1);

        let positions: Vec<i64> = Task::find_by_list_id(&pool, todo)
            .await
            .unwrap()
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(positions, vec![0, 2]);

        // The next append still goes after the current maximum.
        let d = add(&pool, todo, user, "d").await;
        assert_eq!(d.position, 3);
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let pool = test_support::pool().await;
        let (user, todo, _) = board(&pool).await;
        let task = Task::create(
            &pool,
            &CreateTask {
                list_id: todo,
                title: "write docs".into(),
                description: Some("all of them".into()),
                priority: Some(TaskPriority::High),
                due_date: NaiveDate::from_ymd_opt(2026, 12, 1),
            },
            user,
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let updated = Task::update(
            &pool,
            task.id,
            &UpdateTask {
                priority: Some(TaskPriority::Urgent),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.priority, TaskPriority::Urgent);
        assert_eq!(updated.title, "write docs");
        assert_eq!(updated.description.as_deref(), Some("all of them"));
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(updated.position, task.position);
    }

    #[tokio::test]
    async fn project_tasks_follow_list_order() {
        let pool = test_support::pool().await;
        let (user, todo, done) = board(&pool).await;
        let first_done = add(&pool, done, user, "shipped").await;
        let first_todo = add(&pool, todo, user, "planned").await;

        let list = first_todo.parent_list(&pool).await.unwrap().unwrap();
        let tasks = Task::find_by_project_id(&pool, list.project_id).await.unwrap();
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first_todo.id, first_done.id]);
    }
}
