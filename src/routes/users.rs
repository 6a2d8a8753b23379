use actix_web::{get, patch, web, HttpResponse, Responder};
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    error::AppError,
    logging::{redacted, Timer},
    models::{ProfileUpdate, UserProfile},
    routes::validated,
    state::AppState,
};

const USER_NOT_FOUND: &str = "User not found";
const EMAIL_IN_USE: &str = "Email already in use";

fn user_not_found(user_id: Uuid) -> AppError {
    log::debug!("[user {}] profile not found", user_id);
    AppError::NotFound(USER_NOT_FOUND.into())
}

fn email_in_use(user_id: Uuid) -> AppError {
    log::debug!("[user {}] profile email already in use", user_id);
    AppError::Conflict(EMAIL_IN_USE.into())
}

/// Returns the authenticated user's profile.
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("get profile", Some(auth.user_id));
    let user = state
        .users
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}

/// Updates name and/or email.
///
/// ## Responses:
/// - `200 OK`: the updated profile. An empty body returns the profile unchanged.
/// - `400 Bad Request`: name shorter than 2 characters or invalid email.
/// - `409 Conflict`: the email belongs to another account.
#[patch("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    update: web::Json<ProfileUpdate>,
    auth: AuthContext,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("update profile", Some(auth.user_id));
    log::debug!("update profile request: {}", redacted(&*update));
    validated(&*update, "update profile")?;

    let update = update.into_inner();
    if update.is_empty() {
        let user = state
            .users
            .find_user(auth.user_id)
            .await?
            .ok_or_else(|| user_not_found(auth.user_id))?;
        timer.finish(auth.user_id);
        return Ok(HttpResponse::Ok().json(UserProfile::from(&user)));
    }

    if let Some(email) = update.email.as_deref() {
        if let Some(owner) = state.users.find_user_by_email(email).await? {
            if owner.id != auth.user_id {
                return Err(email_in_use(auth.user_id));
            }
        }
    }

    let user = state
        .users
        .update_user(auth.user_id, update)
        .await
        .map_err(|err| match err {
            AppError::Conflict(_) => email_in_use(auth.user_id),
            other => other,
        })?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    timer.finish(auth.user_id);

    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}
