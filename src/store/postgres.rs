use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, Task, TaskPatch, TaskQuery, UserRecord};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, priority, status, user_id, created_at, updated_at";

/// Postgres-backed store using runtime-checked `sqlx` queries.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

fn email_conflict(error: sqlx::Error) -> AppError {
    match AppError::from(error) {
        AppError::Conflict(_) => AppError::Conflict("Email already in use".into()),
        other => other,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let record = UserRecord::new(user);
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.password_hash)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(email_conflict)
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        let sql = format!(
            "UPDATE users \
             SET name = COALESCE($2, name), email = COALESCE($3, email), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(email_conflict)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, user_id: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        // Absent filters are bound as typed NULLs and match every row.
        let sql = format!(
            "SELECT {} FROM tasks \
             WHERE user_id = $1 \
               AND ($2::task_status IS NULL OR status = $2) \
               AND ($3::task_priority IS NULL OR priority = $3) \
             ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(query.status)
            .bind(query.priority)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.priority)
            .bind(task.status)
            .bind(task.user_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 priority = COALESCE($5, priority), \
                 status = COALESCE($6, status), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.priority)
            .bind(patch.status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
