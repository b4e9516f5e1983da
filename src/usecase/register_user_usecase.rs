use tracing::warn;

use crate::domain::{
    error::RegistrationError,
    models::user::{NewUser, RegistrationRequest, SafeUser},
    repositories::user_repository::UserRepository,
    services::media_service::MediaUploader,
};

pub struct RegisterUserUsecase<R: UserRepository, M: MediaUploader> {
    user_repository: R,
    media_uploader: M,
}

impl<R: UserRepository, M: MediaUploader> RegisterUserUsecase<R, M> {
    pub fn new(user_repository: R, media_uploader: M) -> Self {
        Self {
            user_repository,
            media_uploader,
        }
    }

    /// Runs the registration workflow. Steps are strictly ordered; each one
    /// assumes everything before it succeeded.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<SafeUser, RegistrationError>
    where
        R: Send + Sync,
        M: Send + Sync,
    {
        // All four text fields must survive trimming
        if [
            &request.full_name,
            &request.email,
            &request.username,
            &request.password,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
        {
            return Err(RegistrationError::Validation(
                "All fields are required".to_string(),
            ));
        }

        // Advisory duplicate check; the unique indexes have the last word
        let existing = self
            .user_repository
            .find_by_username_or_email(&request.username, &request.email)
            .await?;
        if existing.is_some() {
            return Err(RegistrationError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let avatar_path = request
            .avatar_path
            .as_deref()
            .ok_or_else(|| RegistrationError::Validation("Avatar file is required".to_string()))?;

        // Avatar upload failure is fatal; cover image failure is not
        let avatar = self.media_uploader.upload(avatar_path).await.map_err(|e| {
            warn!("avatar upload failed: {e}");
            RegistrationError::Validation("Avatar file is required".to_string())
        })?;

        let cover_image_url = match request.cover_image_path.as_deref() {
            Some(path) => match self.media_uploader.upload(path).await {
                Ok(media) => media.url,
                Err(e) => {
                    warn!("cover image upload failed, continuing without one: {e}");
                    String::new()
                }
            },
            None => String::new(),
        };

        let created = self
            .user_repository
            .create(NewUser {
                full_name: request.full_name,
                email: request.email,
                username: request.username.to_lowercase(),
                password: request.password,
                avatar_url: avatar.url,
                cover_image_url,
            })
            .await?;

        // Re-read through the safe projection; a miss here means the insert
        // did not stick
        self.user_repository
            .find_safe_by_id(created.id)
            .await?
            .ok_or_else(|| {
                RegistrationError::Internal(
                    "Something went wrong while registering the user".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;
    use chrono::Utc;
    use rstest::*;
    use sea_orm::prelude::Uuid;

    use super::*;
    use crate::domain::{
        error::{RepositoryError, UploadError},
        models::user::{HashedPassword, User},
        services::media_service::UploadedMedia,
    };

    /// In-memory store that records every create call and enforces the
    /// unique indexes the way the real table does.
    #[derive(Clone, Default)]
    struct InMemoryUserRepository {
        users: Arc<Mutex<Vec<User>>>,
    }

    impl InMemoryUserRepository {
        fn seeded(username: &str, email: &str) -> Self {
            let repo = Self::default();
            repo.users.lock().unwrap().push(User {
                id: Uuid::new_v4(),
                full_name: "Seeded User".to_string(),
                email: email.to_string(),
                username: username.to_string(),
                password_hash: HashedPassword::new("seeded_hash".to_string()),
                avatar_url: "https://media.test/seeded.png".to_string(),
                cover_image_url: String::new(),
                refresh_token: None,
            });
            repo
        }

        fn created_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_username_or_email(
            &self,
            username: &str,
            email: &str,
        ) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|user| user.username == username || user.email == email)
                .cloned())
        }

        async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users
                .iter()
                .any(|user| user.username == new_user.username || user.email == new_user.email)
            {
                return Err(RepositoryError::UniqueViolation(
                    "duplicate entry".to_string(),
                ));
            }
            let user = User {
                id: Uuid::new_v4(),
                full_name: new_user.full_name,
                email: new_user.email,
                username: new_user.username,
                password_hash: HashedPassword::new("mock_hash".to_string()),
                avatar_url: new_user.avatar_url,
                cover_image_url: new_user.cover_image_url,
                refresh_token: None,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_safe_by_id(&self, id: Uuid) -> Result<Option<SafeUser>, RepositoryError> {
            let now = Utc::now().fixed_offset();
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|user| user.id == id)
                .map(|user| SafeUser {
                    id: user.id,
                    full_name: user.full_name.clone(),
                    email: user.email.clone(),
                    username: user.username.clone(),
                    avatar_url: user.avatar_url.clone(),
                    cover_image_url: user.cover_image_url.clone(),
                    created_at: now,
                    updated_at: now,
                }))
        }
    }

    /// Store whose projection read always misses, for the lost-insert path.
    #[derive(Clone, Default)]
    struct VanishingUserRepository {
        inner: InMemoryUserRepository,
    }

    #[async_trait]
    impl UserRepository for VanishingUserRepository {
        async fn find_by_username_or_email(
            &self,
            username: &str,
            email: &str,
        ) -> Result<Option<User>, RepositoryError> {
            self.inner.find_by_username_or_email(username, email).await
        }

        async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
            self.inner.create(new_user).await
        }

        async fn find_safe_by_id(&self, _id: Uuid) -> Result<Option<SafeUser>, RepositoryError> {
            Ok(None)
        }
    }

    #[derive(Clone)]
    struct MockMediaUploader {
        fail: bool,
    }

    #[async_trait]
    impl MediaUploader for MockMediaUploader {
        async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, UploadError> {
            if self.fail {
                return Err(UploadError::Transport("connection refused".to_string()));
            }
            let file_name = local_path.file_name().unwrap().to_string_lossy();
            Ok(UploadedMedia {
                url: format!("https://media.test/{file_name}"),
            })
        }
    }

    fn request(username: &str, email: &str) -> RegistrationRequest {
        RegistrationRequest {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: "hunter2!".to_string(),
            avatar_path: Some(PathBuf::from("avatar.png")),
            cover_image_path: Some(PathBuf::from("cover.png")),
        }
    }

    fn usecase(
        repo: InMemoryUserRepository,
        fail_uploads: bool,
    ) -> RegisterUserUsecase<InMemoryUserRepository, MockMediaUploader> {
        RegisterUserUsecase::new(repo, MockMediaUploader { fail: fail_uploads })
    }

    #[rstest]
    #[case::empty_full_name("", "bob@example.com", "bob", "pw")]
    #[case::empty_email("Bob", "", "bob", "pw")]
    #[case::empty_username("Bob", "bob@example.com", "", "pw")]
    #[case::empty_password("Bob", "bob@example.com", "bob", "")]
    #[case::whitespace_full_name("   ", "bob@example.com", "bob", "pw")]
    #[case::whitespace_password("Bob", "bob@example.com", "bob", " \t ")]
    #[tokio::test]
    async fn test_register_empty_field_negative(
        #[case] full_name: &str,
        #[case] email: &str,
        #[case] username: &str,
        #[case] password: &str,
    ) {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), false);

        let result = service
            .register(RegistrationRequest {
                full_name: full_name.to_string(),
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                avatar_path: Some(PathBuf::from("avatar.png")),
                cover_image_path: None,
            })
            .await;

        match result {
            Err(RegistrationError::Validation(msg)) => {
                assert_eq!(msg, "All fields are required")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repo.created_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_missing_avatar_negative() {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), false);

        let mut req = request("bob", "bob@example.com");
        req.avatar_path = None;

        let result = service.register(req).await;

        match result {
            Err(RegistrationError::Validation(msg)) => {
                assert_eq!(msg, "Avatar file is required")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repo.created_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_existing_username_negative() {
        let repo = InMemoryUserRepository::seeded("alice", "alice@example.com");
        let service = usecase(repo.clone(), false);

        let result = service.register(request("alice", "other@example.com")).await;

        match result {
            Err(RegistrationError::Conflict(msg)) => {
                assert_eq!(msg, "User with email or username already exists")
            }
            other => panic!("expected conflict error, got {other:?}"),
        }
        assert_eq!(repo.created_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_avatar_upload_failure_negative() {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), true);

        let result = service.register(request("bob", "bob@example.com")).await;

        match result {
            Err(RegistrationError::Validation(msg)) => {
                assert_eq!(msg, "Avatar file is required")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repo.created_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_positive_with_cover() {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), false);

        let safe_user = service
            .register(request("BobTheBuilder", "bob@example.com"))
            .await
            .expect("registration should succeed");

        assert_eq!(safe_user.username, "bobthebuilder");
        assert_eq!(safe_user.avatar_url, "https://media.test/avatar.png");
        assert_eq!(safe_user.cover_image_url, "https://media.test/cover.png");
        assert_eq!(repo.created_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_positive_without_cover() {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), false);

        let mut req = request("bob", "bob@example.com");
        req.cover_image_path = None;

        let safe_user = service.register(req).await.expect("should succeed");

        assert_eq!(safe_user.cover_image_url, "");
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_twice_conflicts_negative() {
        let repo = InMemoryUserRepository::default();
        let service = usecase(repo.clone(), false);

        service
            .register(request("bob", "bob@example.com"))
            .await
            .expect("first registration should succeed");

        let second = service.register(request("bob", "bob@example.com")).await;

        assert!(matches!(second, Err(RegistrationError::Conflict(_))));
        assert_eq!(repo.created_count(), 1);
    }

    // The pre-check compares the submitted casing, so a differently-cased
    // username slips past it and must be stopped by the store's unique index.
    #[rstest]
    #[tokio::test]
    async fn test_register_unique_violation_maps_to_conflict() {
        let repo = InMemoryUserRepository::seeded("bob", "seed@example.com");
        let service = usecase(repo.clone(), false);

        let result = service.register(request("BOB", "bob@example.com")).await;

        match result {
            Err(RegistrationError::Conflict(msg)) => {
                assert_eq!(msg, "User with email or username already exists")
            }
            other => panic!("expected conflict error, got {other:?}"),
        }
        assert_eq!(repo.created_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_lost_insert_negative() {
        let repo = VanishingUserRepository::default();
        let service = RegisterUserUsecase::new(repo, MockMediaUploader { fail: false });

        let result = service.register(request("bob", "bob@example.com")).await;

        match result {
            Err(RegistrationError::Internal(msg)) => {
                assert_eq!(msg, "Something went wrong while registering the user")
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
