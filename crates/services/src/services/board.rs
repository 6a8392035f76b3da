//! Client-side model of a project board and its drag-and-drop lifecycle.
//!
//! A [`BoardView`] caches the lists of one project and the tasks of each
//! list as they were when last loaded. Dropping a dragged task appends it to
//! the target list using the cached length as the new position, then reloads
//! everything. Two views working from the same stale snapshot can therefore
//! assign the same position in one list.

use std::collections::HashMap;

use db::models::{list::List, task::Task};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use super::kanban::{KanbanError, KanbanService};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BoardColumn {
    #[serde(flatten)]
    #[ts(flatten)]
    pub list: List,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BoardSnapshot {
    pub project_id: Uuid,
    pub lists: Vec<BoardColumn>,
}

#[derive(Debug, Clone)]
pub struct BoardView {
    project_id: Uuid,
    lists: Vec<List>,
    tasks_by_list: HashMap<Uuid, Vec<Task>>,
    dragged_task: Option<Task>,
    drag_over_list: Option<Uuid>,
}

impl BoardView {
    pub async fn load(pool: &SqlitePool, project_id: Uuid) -> Result<Self, sqlx::Error> {
        let lists = List::find_by_project_id(pool, project_id).await?;
        let tasks = Task::find_by_project_id(pool, project_id).await?;
        Ok(Self::from_parts(project_id, lists, tasks))
    }

    /// Groups `tasks` under their lists. Tasks are expected in render order;
    /// tasks whose list is not in `lists` are dropped.
    pub fn from_parts(project_id: Uuid, lists: Vec<List>, tasks: Vec<Task>) -> Self {
        let mut tasks_by_list: HashMap<Uuid, Vec<Task>> =
            lists.iter().map(|l| (l.id, Vec::new())).collect();
        for task in tasks {
            if let Some(bucket) = tasks_by_list.get_mut(&task.list_id) {
                bucket.push(task);
            }
        }
        Self {
            project_id,
            lists,
            tasks_by_list,
            dragged_task: None,
            drag_over_list: None,
        }
    }

    /// Replaces the cached lists and tasks. Drag state is cleared.
    pub async fn reload(&mut self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        *self = Self::load(pool, self.project_id).await?;
        Ok(())
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn tasks_in(&self, list_id: Uuid) -> &[Task] {
        self.tasks_by_list
            .get(&list_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn dragged_task(&self) -> Option<&Task> {
        self.dragged_task.as_ref()
    }

    pub fn drag_over_list(&self) -> Option<Uuid> {
        self.drag_over_list
    }

    /// Picks up a cached task. Returns false when the task is not on the board.
    pub fn drag_start(&mut self, task_id: Uuid) -> bool {
        let task = self
            .tasks_by_list
            .values()
            .flatten()
            .find(|t| t.id == task_id)
            .cloned();
        let found = task.is_some();
        self.dragged_task = task;
        found
    }

    pub fn drag_over(&mut self, list_id: Uuid) {
        self.drag_over_list = Some(list_id);
    }

    pub fn drag_leave(&mut self) {
        self.drag_over_list = None;
    }

    /// Position a task dropped on `list_id` would receive: the number of
    /// tasks currently cached for that list.
    pub fn drop_position(&self, list_id: Uuid) -> i64 {
        self.tasks_in(list_id).len() as i64
    }

    /// Completes a drag on `list_id`.
    ///
    /// Without a dragged task this is a no-op returning `Ok(None)`. Otherwise
    /// the task is moved to the end of the cached target list and the view is
    /// reloaded, even when the dragged task already lives in `list_id`. The
    /// reload also runs when the move fails, so a rejected drop still leaves
    /// the view matching the store.
    pub async fn drop(
        &mut self,
        pool: &SqlitePool,
        list_id: Uuid,
    ) -> Result<Option<Task>, KanbanError> {
        self.drag_over_list = None;
        let Some(task) = self.dragged_task.take() else {
            return Ok(None);
        };

        let position = self.drop_position(list_id);
        debug!(task_id = %task.id, from = %task.list_id, to = %list_id, position, "Dropping task");
        let moved = KanbanService::move_task(pool, task.id, list_id, position).await;
        self.reload(pool).await?;
        Ok(Some(moved?))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            project_id: self.project_id,
            lists: self
                .lists
                .iter()
                .map(|list| BoardColumn {
                    list: list.clone(),
                    tasks: self.tasks_in(list.id).to_vec(),
                })
                .collect(),
        }
    }
}
