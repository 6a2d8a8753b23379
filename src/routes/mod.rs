pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest};
use validator::Validate;

use crate::error::AppError;
use crate::state::AppState;

/// Registers every route, the shared state and the extractor error handlers.
///
/// `/`, `/health` and `/api/auth/*` are public. `/api/tasks` and `/api/users` sit
/// behind the authenticator built from `state`.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let gate = state.authenticator();

        cfg.app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .service(health::index)
            .service(health::health)
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .service(auth::register)
                            .service(auth::login),
                    )
                    .service(
                        web::scope("/tasks")
                            .wrap(gate.clone())
                            .app_data(web::PathConfig::default().error_handler(task_id_error))
                            .service(tasks::get_tasks)
                            .service(tasks::create_task)
                            .service(tasks::get_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(gate)
                            .service(users::get_profile)
                            .service(users::update_profile),
                    ),
            );
    }
}

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("malformed body on {}: {}", req.path(), err);
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("malformed query on {}: {}", req.path(), err);
    AppError::BadRequest(err.to_string()).into()
}

// A task id that is not a UUID cannot name an existing task.
fn task_id_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("unparseable task id on {}: {}", req.path(), err);
    AppError::NotFound("Task not found".into()).into()
}

/// Runs schema validation, logging the rejected fields.
pub(crate) fn validated<T: Validate>(input: &T, operation: &str) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        log::debug!("{} rejected: {}", operation, errors);
        AppError::from(errors)
    })
}
