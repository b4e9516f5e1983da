pub mod media_service;
pub mod password_service;
