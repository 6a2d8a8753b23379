//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application,
//! plus the `AuthError` reasons the authenticator and login flow reject requests with.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers, extractors and
//! middleware can return it directly and get a JSON body of the form `{"error": "..."}`.
//! Validation failures additionally carry a `details` object with per-field errors.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors` and
//! `bcrypt::BcryptError` allow the `?` operator. Token failures are reported by
//! `TokenCodec` itself as `AuthError::InvalidToken`.
//!
//! Internal failures are logged with their full detail but rendered with a generic
//! message, so database or codec internals never reach a client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned to clients for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error processing the request";

/// Reasons a request is rejected as unauthenticated (HTTP 401).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or one without the `Bearer ` prefix.
    MissingToken,
    /// Bad signature, malformed structure or expired token.
    InvalidToken,
    /// The token is valid but its subject no longer exists in the credential store.
    UnknownIdentity,
    /// Login with an unknown email or a wrong password. Both cases share this variant.
    InvalidCredentials,
}

impl AuthError {
    /// Client-facing message for this rejection.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authentication token not provided",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::UnknownIdentity => "User not found",
            AuthError::InvalidCredentials => "Invalid credentials",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error. These errors are converted
/// into HTTP responses by the `ResponseError` implementation below.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(AuthError),
    /// Malformed request, e.g. a body that is not valid JSON for the endpoint (HTTP 400).
    BadRequest(String),
    /// Input failed schema validation (HTTP 400 with field-level details).
    ValidationError(ValidationErrors),
    /// The requested resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// The write would violate a uniqueness rule, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(reason) => write!(f, "Unauthorized: {}", reason),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(errors) => write!(f, "Validation Error: {}", errors),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Unauthorized(reason) => json!({ "error": reason.message() }),
            AppError::BadRequest(msg) => json!({
                "error": "Invalid data",
                "details": msg
            }),
            AppError::ValidationError(errors) => json!({
                "error": "Invalid data",
                "details": errors
            }),
            AppError::NotFound(msg) | AppError::Conflict(msg) => json!({ "error": msg }),
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("{}", detail);
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<AuthError> for AppError {
    fn from(reason: AuthError) -> AppError {
        AppError::Unauthorized(reason)
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, unique-constraint violations become `Conflict`,
/// everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Resource already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::ValidationError(errors)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
