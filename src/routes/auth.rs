use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    auth::{hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest},
    error::{AppError, AuthError},
    logging::{redacted, Timer},
    models::{NewUser, UserProfile},
    routes::validated,
    state::AppState,
};

/// Register a new user
///
/// Creates an account and returns its public profile with a freshly issued token.
///
/// ## Responses:
/// - `201 Created`: `{ user, token }`.
/// - `400 Bad Request`: invalid name, email or password.
/// - `409 Conflict`: the email is already registered.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("register", None);
    log::debug!("register request: {}", redacted(&*register_data));
    validated(&*register_data, "register")?;

    let RegisterRequest {
        name,
        email,
        password,
    } = register_data.into_inner();

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists".into(),
        ));
    }

    let password_hash = hash_password(&password, state.bcrypt_cost)?;

    // A concurrent registration can still win the race; the store's uniqueness
    // check reports it with the same message.
    let user = state
        .users
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|err| match err {
            AppError::Conflict(_) => {
                AppError::Conflict("A user with this email already exists".into())
            }
            other => other,
        })?;

    let token = state.tokens.issue(user.id)?;
    timer.finish(user.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

/// Login user
///
/// Exchanges email and password for a token. An unknown email and a wrong password
/// produce the same 401 so callers cannot probe which accounts exist.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let timer = Timer::start("login", None);
    log::debug!("login request: {}", redacted(&*login_data));
    validated(&*login_data, "login")?;

    let user = state
        .users
        .find_user_by_email(&login_data.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&login_data.password, password_hash)? {
        log::debug!("wrong password for user {}", user.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue(user.id)?;
    timer.finish(user.id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}
