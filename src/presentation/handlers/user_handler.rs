use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::Field,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        error::RegistrationError,
        models::user::RegistrationRequest,
        repositories::user_repository::UserRepository,
        services::media_service::MediaUploader,
    },
    usecase::register_user_usecase::RegisterUserUsecase,
};

// Response

/// json envelope for successful responses
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    pub message: String,
}

/// json envelope for failures
#[derive(Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = match self {
            RegistrationError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistrationError::Conflict(_) => StatusCode::CONFLICT,
            RegistrationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ApiErrorBody {
            status: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/* Router Function and Handler Function */

/// function return Router object
/// Suppose to be nested by main router
pub fn create_user_router<R, M>(
    register_service: RegisterUserUsecase<R, M>,
    upload_dir: PathBuf,
) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: MediaUploader + Send + Sync + 'static,
{
    let state = AppState {
        register_service: Arc::new(register_service),
        upload_dir: Arc::new(upload_dir),
    };

    Router::new()
        .route("/register", post(register::<R, M>))
        .with_state(state)
}

pub struct AppState<R: UserRepository, M: MediaUploader> {
    pub register_service: Arc<RegisterUserUsecase<R, M>>,
    pub upload_dir: Arc<PathBuf>,
}

impl<R: UserRepository, M: MediaUploader> Clone for AppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
            upload_dir: Arc::clone(&self.upload_dir),
        }
    }
}

// handler function

/// handler function for register
async fn register<R, M>(
    State(state): State<AppState<R, M>>,
    multipart: Multipart,
) -> Result<Response, RegistrationError>
where
    R: UserRepository + Send + Sync,
    M: MediaUploader + Send + Sync,
{
    let request = read_registration_form(multipart, &state.upload_dir).await?;
    let safe_user = state.register_service.register(request).await?;

    // envelope status stays 200 even though the route replies 201
    let body = ApiResponse {
        status: 200,
        data: safe_user,
        message: "User registered Successfully".to_string(),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Drains the multipart stream into a registration request. Text parts land
/// as fields, file parts are staged under the spool directory. Unknown parts
/// are ignored; missing text parts stay empty and fail field validation
/// downstream.
async fn read_registration_form(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<RegistrationRequest, RegistrationError> {
    let mut full_name = String::new();
    let mut email = String::new();
    let mut username = String::new();
    let mut password = String::new();
    let mut avatar_path = None;
    let mut cover_image_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RegistrationError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(|name| name.to_string()) else {
            continue;
        };
        match name.as_str() {
            "fullName" => full_name = read_text(field).await?,
            "email" => email = read_text(field).await?,
            "username" => username = read_text(field).await?,
            "password" => password = read_text(field).await?,
            "avatar" => avatar_path = Some(stage_file(field, upload_dir).await?),
            "coverImage" => cover_image_path = Some(stage_file(field, upload_dir).await?),
            _ => {}
        }
    }

    Ok(RegistrationRequest {
        full_name,
        email,
        username,
        password,
        avatar_path,
        cover_image_path,
    })
}

async fn read_text(field: Field<'_>) -> Result<String, RegistrationError> {
    field
        .text()
        .await
        .map_err(|e| RegistrationError::Validation(e.to_string()))
}

/// Writes an uploaded part into the spool directory under a fresh name,
/// keeping the client's extension.
async fn stage_file(field: Field<'_>, upload_dir: &Path) -> Result<PathBuf, RegistrationError> {
    let extension = field
        .file_name()
        .and_then(|name| Path::new(name).extension())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let data = field
        .bytes()
        .await
        .map_err(|e| RegistrationError::Validation(e.to_string()))?;

    let path = upload_dir.join(format!("{}{}", Uuid::new_v4(), extension));
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| RegistrationError::Internal(e.to_string()))?;

    Ok(path)
}
