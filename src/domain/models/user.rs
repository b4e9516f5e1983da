use chrono::{DateTime, FixedOffset};
use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Value object representing a hashed password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Create a new HashedPassword from an already hashed string
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Input to the registration workflow, one per inbound request. Text fields
/// arrive exactly as submitted; file fields are local paths staged by the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar_path: Option<PathBuf>,
    pub cover_image_path: Option<PathBuf>,
}

/// Field set handed to the store on create. `username` is already
/// lower-cased; `password` is still plaintext and is hashed by the store
/// before it touches the table.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar_url: String,
    pub cover_image_url: String,
}

/// A persisted user record as the domain sees it, credential fields
/// included. Never serialized to a caller.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: HashedPassword,
    pub avatar_url: String,
    pub cover_image_url: String,
    pub refresh_token: Option<String>,
}

/// Projection of a user record with `password_hash` and `refresh_token`
/// stripped. The only shape ever returned to a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub avatar_url: String,
    pub cover_image_url: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}
