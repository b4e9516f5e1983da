pub mod argon2_password_hasher;
pub mod hosted_media_uploader;
pub mod user_repository;
