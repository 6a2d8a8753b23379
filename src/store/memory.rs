use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, Task, TaskPatch, TaskQuery, UserRecord};

/// In-process store with the same observable behavior as [`super::PgStore`],
/// including email uniqueness and owner scoping. Used by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hard-deletes a user and their tasks. Not reachable through the API.
    pub async fn remove_user(&self, id: Uuid) -> bool {
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            self.tasks.write().await.retain(|_, task| task.user_id != id);
        }
        removed
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::Conflict("Email already in use".into()));
        }
        let record = UserRecord::new(user);
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        let mut users = self.users.write().await;
        if let Some(email) = &update.email {
            if users.values().any(|other| other.id != id && &other.email == email) {
                return Err(AppError::Conflict("Email already in use".into()));
            }
        }
        Ok(users.get_mut(&id).map(|user| {
            user.apply(update);
            user.clone()
        }))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, user_id: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|task| task.user_id == user_id && query.matches(task))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|task| task.user_id == user_id).cloned())
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .get_mut(&id)
            .filter(|task| task.user_id == user_id)
            .map(|task| {
                task.apply(patch);
                task.clone()
            }))
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(task) if task.user_id == user_id => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
