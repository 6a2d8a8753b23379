use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    Pending,
    /// Currently being worked on.
    InProgress,
    Completed,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 3 and 200 characters.
    #[validate(length(min = 3, max = 200, message = "Title must be at least 3 characters"))]
    pub title: String,

    /// Maximum length of 1000 characters if provided. Stored as an empty string when absent.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: TaskPriority,

    pub status: TaskStatus,
}

/// Partial update for an existing task. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 3, max = 200, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for filtering the task list.
/// Listing is always scoped to the authenticated user.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh UUID and both
    /// timestamps set to now.
    pub fn new(input: TaskInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            priority: input.priority,
            status: input.status,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update in place and bumps `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
