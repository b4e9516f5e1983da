use crate::domain::{
    error::RepositoryError,
    models::user::{NewUser, SafeUser, User},
};
use async_trait::async_trait;
use sea_orm::prelude::Uuid;

/// Persistence seam for user records. Uniqueness of username and email is
/// guaranteed by the store's unique indexes; `create` reports a violation as
/// `RepositoryError::UniqueViolation`.
#[async_trait]
pub trait UserRepository {
    /// Existence probe for the pre-insert duplicate check. Matches either
    /// column against the values as submitted.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    /// Fetch a record with the credential columns stripped.
    async fn find_safe_by_id(&self, id: Uuid) -> Result<Option<SafeUser>, RepositoryError>;
}
