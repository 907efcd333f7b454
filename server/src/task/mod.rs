use crate::entities::*;
use chrono::{DateTime, Local};
use sea_orm::*;

pub mod web;

/// Format of the `created_at` column, e.g. "Aug 25, 2026  14:03".
pub const CREATED_AT_FORMAT: &str = "%b %d, %Y  %H:%M";

/// Formats a local wall-clock instant the way it is stored and displayed.
pub fn format_created_at(instant: DateTime<Local>) -> String {
    instant.format(CREATED_AT_FORMAT).to_string()
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: u32,
    description: String,
    created_at: String,
}

impl Task {
    pub fn new(id: u32, description: String, created_at: String) -> Self {
        Self {
            id,
            description,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp of the task.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(model.id as u32, model.description, model.created_at)
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService { db }
    }

    /// Retrieves all tasks, newest first.
    ///
    /// Storage order is insertion order (oldest first); the sequence is
    /// reversed on load so the most recently added task comes first.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .rev()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Creates a new task stamped with the caller-supplied clock.
    ///
    /// A description that is empty after trimming is rejected without
    /// inserting anything; the rejection is reported as `Ok(None)` rather
    /// than an error.
    ///
    /// # Arguments
    ///
    /// * `description` - The free-text description of the task.
    /// * `now` - The current local time, supplied by the caller.
    ///
    /// # Returns
    ///
    /// A `Result` containing `Some(Task)` if a task was created, `None` if the
    /// description was rejected, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        description: &str,
        now: DateTime<Local>,
    ) -> Result<Option<Task>, TaskServiceError> {
        let description = description.trim();
        if description.is_empty() {
            tracing::info!("Rejecting task with empty description");
            return Ok(None);
        }

        let active_model = task::ActiveModel {
            description: ActiveValue::Set(description.to_string()),
            created_at: ActiveValue::Set(format_created_at(now)),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Some(Task::from(created_model)))
    }

    /// Renames a task by its ID.
    ///
    /// Only the description changes; `created_at` keeps the value assigned
    /// when the task was added.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to rename.
    /// * `new_description` - The new description for the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn rename(&self, id: u32, new_description: &str) -> Result<Task, TaskServiceError> {
        let task_to_update = task::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.description = ActiveValue::Set(new_description.to_string());
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Removes a task by its ID.
    ///
    /// Removing an ID that does not exist is a no-op.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to remove.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: u32) -> Result<(), TaskServiceError> {
        let result = task::Entity::delete_by_id(id as i32).exec(self.db).await?;
        if result.rows_affected == 0 {
            tracing::debug!("No task with ID {} to remove", id);
        }
        Ok(())
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let task_model = task::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        Ok(Task::from(task_model))
    }
}
