use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DerivePartialModel, EntityTrait,
    FromQueryResult, QueryFilter, SqlErr,
    prelude::{DateTimeWithTimeZone, Uuid},
};

use crate::domain::{
    error::RepositoryError,
    models::user::{HashedPassword, NewUser, SafeUser, User},
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};
use entity::users;

#[derive(Clone)]
pub struct MySqlUserRepository<P: PasswordHasher> {
    db: DatabaseConnection,
    password_hasher: P,
}

impl<P: PasswordHasher> MySqlUserRepository<P> {
    pub fn new(db: DatabaseConnection, password_hasher: P) -> Self {
        Self {
            db,
            password_hasher,
        }
    }
}

/// Typed stand-in for a field-exclusion projection: the credential columns
/// never appear in the generated SELECT.
#[derive(DerivePartialModel, FromQueryResult)]
#[sea_orm(entity = "users::Entity")]
struct SafeUserRow {
    id: Uuid,
    username: String,
    email: String,
    full_name: String,
    avatar_url: String,
    cover_image_url: String,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
}

impl From<SafeUserRow> for SafeUser {
    fn from(row: SafeUserRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            username: row.username,
            avatar_url: row.avatar_url,
            cover_image_url: row.cover_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn to_domain(model: users::Model) -> User {
    User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        username: model.username,
        password_hash: HashedPassword::new(model.password_hash),
        avatar_url: model.avatar_url,
        cover_image_url: model.cover_image_url,
        refresh_token: model.refresh_token,
    }
}

#[async_trait]
impl<P: PasswordHasher + Send + Sync> UserRepository for MySqlUserRepository<P> {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let password_hash = self.password_hasher.hash(&new_user.password)?;

        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            username: new_user.username,
            password_hash,
            avatar_url: new_user.avatar_url,
            cover_image_url: new_user.cover_image_url,
            refresh_token: None,
        };

        let now = Utc::now().fixed_offset();
        let user_model = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            full_name: Set(user.full_name.clone()),
            password_hash: Set(user.password_hash.as_str().to_string()),
            avatar_url: Set(user.avatar_url.clone()),
            cover_image_url: Set(user.cover_image_url.clone()),
            refresh_token: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        users::Entity::insert(user_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => {
                    RepositoryError::UniqueViolation(msg)
                }
                _ => RepositoryError::DatabaseError(e.to_string()),
            })?;

        Ok(user)
    }

    async fn find_safe_by_id(&self, id: Uuid) -> Result<Option<SafeUser>, RepositoryError> {
        let row = users::Entity::find_by_id(id)
            .into_partial_model::<SafeUserRow>()
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(SafeUser::from))
    }
}
