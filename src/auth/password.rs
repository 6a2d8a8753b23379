use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes `password` with a random salt at the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
