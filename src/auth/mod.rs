pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{UserProfile, NAME_REGEX};

pub use extractors::AuthContext;
pub use middleware::Authenticator;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec};

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Must be a valid email format.
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, at least 2 characters, no control characters.
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        regex(path = "NAME_REGEX", message = "Name must not contain control characters")
    )]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Response body after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Public profile of the authenticated user.
    pub user: UserProfile,
    /// Bearer token for subsequent requests.
    pub token: String,
}
