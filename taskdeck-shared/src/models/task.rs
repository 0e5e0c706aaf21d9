/// Task model and database operations
///
/// This module provides the Task model and the task store: every operation
/// that reads or mutates a single task takes the caller's account ID and
/// refuses to touch tasks owned by someone else.
///
/// # Status
///
/// `status` is derived from `completed` on every read, and every write that
/// changes `completed` rewrites the stored `status` column in the same
/// statement:
///
/// ```text
/// completed = false  <->  Pending
/// completed = true   <->  Completed
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task (
///     id INTEGER PRIMARY KEY,
///     content VARCHAR(200) NOT NULL,
///     description TEXT,
///     deadline VARCHAR(50),
///     status VARCHAR(20) NOT NULL DEFAULT 'Pending',
///     completed BOOLEAN NOT NULL DEFAULT 0,
///     date_created DATETIME,
///     user_id INTEGER NOT NULL REFERENCES user(id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{Task, TaskInput, TaskStatus};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example(owner_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, owner_id, TaskInput::new("buy milk", None, None)).await?;
/// assert_eq!(task.status, TaskStatus::Pending);
///
/// let task = Task::toggle_completed(&pool, task.id, owner_id).await?;
/// assert_eq!(task.status, TaskStatus::Completed);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use tracing::debug;
use validator::Validate;

use super::first_violation;

const TASK_COLUMNS: &str = "id, content, \
    COALESCE(description, '') AS description, \
    COALESCE(deadline, '') AS deadline, \
    COALESCE(completed, 0) AS completed, \
    CASE WHEN COALESCE(completed, 0) THEN 'Completed' ELSE 'Pending' END AS status, \
    COALESCE(date_created, CURRENT_TIMESTAMP) AS created_at, \
    user_id AS owner_id";

/// Completion status shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    /// The status that matches a completed flag
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    /// Converts status to its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// Error returned when a stored status string is not recognised
#[derive(Debug, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatus(String);

impl TryFrom<String> for TaskStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pending" => Ok(TaskStatus::Pending),
            "Completed" => Ok(TaskStatus::Completed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Task model: a to-do item owned by exactly one account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short summary, never empty
    pub content: String,

    /// Free text, empty when not given
    pub description: String,

    /// Opaque deadline text, empty when not given
    pub deadline: String,

    /// Whether the task is done
    pub completed: bool,

    /// Always consistent with `completed`
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Account that owns the task
    pub owner_id: i64,
}

/// Editable task fields, as submitted by the create and update forms
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Content is required (at most 200 characters)"))]
    pub content: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Deadline must be at most 50 characters"))]
    pub deadline: Option<String>,
}

impl TaskInput {
    pub fn new(content: &str, description: Option<&str>, deadline: Option<&str>) -> Self {
        Self {
            content: content.to_string(),
            description: description.map(str::to_string),
            deadline: deadline.map(str::to_string),
        }
    }

    /// Trims the content and validates field lengths
    fn normalized(self) -> Result<(String, String, String), TaskError> {
        let input = TaskInput {
            content: self.content.trim().to_string(),
            ..self
        };

        input.validate().map_err(|e| {
            let (field, message) = first_violation(&e);
            TaskError::Validation { field, message }
        })?;

        Ok((
            input.content,
            input.description.unwrap_or_default(),
            input.deadline.unwrap_or_default(),
        ))
    }
}

/// Per-account task counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
}

impl TaskStats {
    pub fn pending(&self) -> i64 {
        self.total - self.completed
    }
}

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task has this ID
    #[error("Task {0} not found")]
    NotFound(i64),

    /// The task belongs to another account
    #[error("Task {task_id} is not owned by account {account_id}")]
    Unauthorized { task_id: i64, account_id: i64 },

    /// A submitted field is missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Task {
    /// Creates a new pending task owned by `owner_id`
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Validation` if content is empty or a field is too long.
    pub async fn create(
        pool: &SqlitePool,
        owner_id: i64,
        input: TaskInput,
    ) -> Result<Self, TaskError> {
        let (content, description, deadline) = input.normalized()?;

        let sql = format!(
            "INSERT INTO task (content, description, deadline, status, completed, date_created, user_id) \
             VALUES (?, ?, ?, 'Pending', 0, ?, ?) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(content)
            .bind(description)
            .bind(deadline)
            .bind(Utc::now())
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        debug!(task_id = task.id, owner_id, "Task created");
        Ok(task)
    }

    /// Finds a task by ID regardless of owner
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM task WHERE id = ?");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task and checks that `owner_id` owns it
    ///
    /// # Errors
    ///
    /// - `TaskError::NotFound` if no task has this ID
    /// - `TaskError::Unauthorized` if another account owns it
    pub async fn find_owned(pool: &SqlitePool, id: i64, owner_id: i64) -> Result<Self, TaskError> {
        let task = Self::find_by_id(pool, id)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        if task.owner_id != owner_id {
            return Err(TaskError::Unauthorized {
                task_id: id,
                account_id: owner_id,
            });
        }

        Ok(task)
    }

    /// Lists every task of an account, most recent first
    pub async fn list_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM task WHERE user_id = ? ORDER BY date_created DESC, id DESC"
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Replaces content, description and deadline of an owned task
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        owner_id: i64,
        input: TaskInput,
    ) -> Result<Self, TaskError> {
        Self::find_owned(pool, id, owner_id).await?;
        let (content, description, deadline) = input.normalized()?;

        let sql = format!(
            "UPDATE task SET content = ?, description = ?, deadline = ? \
             WHERE id = ? AND user_id = ? \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(content)
            .bind(description)
            .bind(deadline)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        debug!(task_id = id, owner_id, "Task updated");
        Ok(task)
    }

    /// Flips `completed` and writes the matching `status`
    pub async fn toggle_completed(
        pool: &SqlitePool,
        id: i64,
        owner_id: i64,
    ) -> Result<Self, TaskError> {
        let current = Self::find_owned(pool, id, owner_id).await?;
        let completed = !current.completed;

        let sql = format!(
            "UPDATE task SET completed = ?, status = ? \
             WHERE id = ? AND user_id = ? \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(completed)
            .bind(TaskStatus::from_completed(completed).as_str())
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        debug!(task_id = id, owner_id, completed = task.completed, "Task toggled");
        Ok(task)
    }

    /// Deletes an owned task
    pub async fn delete(pool: &SqlitePool, id: i64, owner_id: i64) -> Result<(), TaskError> {
        Self::find_owned(pool, id, owner_id).await?;

        let result = sqlx::query("DELETE FROM task WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id));
        }

        debug!(task_id = id, owner_id, "Task deleted");
        Ok(())
    }

    /// Counts an account's tasks
    pub async fn stats_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<TaskStats, sqlx::Error> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN COALESCE(completed, 0) THEN 1 ELSE 0 END), 0) \
             FROM task WHERE user_id = ?",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(TaskStats { total, completed })
    }
}
