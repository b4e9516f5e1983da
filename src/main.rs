mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use axum::Router;
use sea_orm::{ConnectOptions, Database};
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{
    infrastructure::{
        argon2_password_hasher::Argon2PasswordHasher, hosted_media_uploader::HostedMediaUploader,
        user_repository::MySqlUserRepository,
    },
    presentation::handlers::user_handler::create_user_router,
    usecase::register_user_usecase::RegisterUserUsecase,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut opt = ConnectOptions::new(dotenvy::var("DATABASE_URL")?);
    opt.max_connections(10)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    let upload_dir = PathBuf::from(
        std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./public/temp".to_string()),
    );
    tokio::fs::create_dir_all(&upload_dir).await?;

    let password_hasher = Argon2PasswordHasher::new();
    let user_repository = MySqlUserRepository::new(db.clone(), password_hasher.clone());
    let media_uploader = HostedMediaUploader::new(
        dotenvy::var("MEDIA_API_URL")?,
        dotenvy::var("MEDIA_API_KEY")?,
    );
    let register_user_usecase = RegisterUserUsecase::new(user_repository, media_uploader);

    let app = Router::new().nest(
        "/api/v1/users",
        create_user_router(register_user_usecase, upload_dir),
    );

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
