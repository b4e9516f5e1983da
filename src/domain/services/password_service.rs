use crate::domain::{error::PasswordHashError, models::user::HashedPassword};

/// Service for hashing passwords before they are persisted. Verification
/// belongs to the login flow, which lives elsewhere.
pub trait PasswordHasher: Clone {
    /// Hash a plain text password
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, PasswordHashError>;
}
