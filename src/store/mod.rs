//! Persistence seams.
//!
//! Handlers and the authenticator only see these traits; `main` wires in the
//! Postgres implementation and the tests use the in-memory one. Every operation
//! is a single point query or write. Uniqueness of emails is enforced by the
//! store itself and surfaces as `AppError::Conflict`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, Task, TaskPatch, TaskQuery, UserRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Inserts a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Applies a profile update. Returns `None` if the user does not exist and
    /// fails with `Conflict` if the new email is taken.
    async fn update_user(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError>;
}

/// Task persistence. Every operation is scoped to the owning user: a task that
/// belongs to someone else behaves exactly like one that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// The owner's tasks matching `query`, newest first.
    async fn list_tasks(&self, user_id: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn create_task(&self, task: Task) -> Result<Task, AppError>;

    async fn update_task(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Returns `false` if nothing was deleted.
    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}
