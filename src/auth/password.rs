// src/auth/password.rs
use tracing::error;

use crate::errors::ServerError;

pub use bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Hash a password with bcrypt. The salt and cost are part of the output.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ServerError> {
    bcrypt::hash(password, cost)
        .map_err(|e| {
            error!(cost, error = %e, "password hashing failed");
            ServerError::InternalError
        })
}

/// Any malformed stored value simply fails verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
