use crate::{
    auth::AuthContext,
    error::AppError,
    logging::{redacted, Timer},
    models::{Task, TaskInput, TaskPatch, TaskQuery},
    routes::validated,
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

const TASK_NOT_FOUND: &str = "Task not found";

fn task_not_found(user_id: Uuid, id: Uuid) -> AppError {
    log::debug!("[user {}] task {} not found", user_id, id);
    AppError::NotFound(TASK_NOT_FOUND.into())
}

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): `pending`, `in_progress` or `completed`.
/// - `priority` (optional): `low`, `medium` or `high`.
///
/// Tasks are ordered by creation date, newest first.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("list tasks", Some(auth.user_id));
    let tasks = state.tasks.list_tasks(auth.user_id, &query_params).await?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: title shorter than 3 characters, unknown enum value or malformed body.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("create task", Some(auth.user_id));
    log::debug!("create task request: {}", redacted(&*task_data));
    validated(&*task_data, "create task")?;

    let task = state
        .tasks
        .create_task(Task::new(task_data.into_inner(), auth.user_id))
        .await?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. A task owned by someone else is reported as not found.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("get task", Some(auth.user_id));
    let id = task_id.into_inner();
    let task = state
        .tasks
        .find_task(auth.user_id, id)
        .await?
        .ok_or_else(|| task_not_found(auth.user_id, id))?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Fields absent from the body keep their values.
///
/// Existence and ownership are checked before the body is validated, so an
/// unknown task is 404 whatever the payload.
#[patch("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("update task", Some(auth.user_id));
    let id = task_id.into_inner();
    log::debug!("update task {} request: {}", id, redacted(&*task_data));

    if state.tasks.find_task(auth.user_id, id).await?.is_none() {
        return Err(task_not_found(auth.user_id, id));
    }
    validated(&*task_data, "update task")?;

    let task = state
        .tasks
        .update_task(auth.user_id, id, task_data.into_inner())
        .await?
        .ok_or_else(|| task_not_found(auth.user_id, id))?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the authenticated user owns.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("delete task", Some(auth.user_id));
    let id = task_id.into_inner();
    if !state.tasks.delete_task(auth.user_id, id).await? {
        return Err(task_not_found(auth.user_id, id));
    }
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
