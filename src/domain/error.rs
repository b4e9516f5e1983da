use thiserror::Error;

/// Failure channel of the registration workflow. Each variant carries the
/// message surfaced to the caller; the HTTP status mapping lives in the
/// presentation layer.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read media file: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload request failed: {0}")]
    Transport(String),

    #[error("media host rejected upload: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordHashError(pub String);

impl From<RepositoryError> for RegistrationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // the unique index is the authoritative duplicate check; a
            // violation on insert is a conflict, not an internal fault
            RepositoryError::UniqueViolation(_) => RegistrationError::Conflict(
                "User with email or username already exists".to_string(),
            ),
            RepositoryError::DatabaseError(msg) => RegistrationError::Internal(msg),
            RepositoryError::PasswordHash(e) => RegistrationError::Internal(e.to_string()),
        }
    }
}
