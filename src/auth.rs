//! Signup and login against user records in the store.
//!
//! No session or token is issued; a successful login only confirms the
//! username.

use chrono::Utc;
use thiserror::Error;

use crate::constants::{ERR_INVALID_USERNAME, ERR_PASSWORD_TOO_SHORT};
use crate::db::{Store, StoreError};
use crate::error::AppError;
use crate::keys::user_path;
use crate::models::UserRecord;
use crate::security::{hash_password, verify_password};

/// Error type for signup and login (constrained to only possible errors)
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid format: {0}")]
    InvalidFormat(&'static str),

    #[error("User already exists")]
    AlreadyExists,

    #[error("User not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidFormat(msg) => AppError::InvalidInput(msg.to_string()),
            AuthError::AlreadyExists => AppError::UserAlreadyExists,
            AuthError::NotFound => AppError::UserNotFound,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Store(e) => AppError::Store(e),
            AuthError::Internal(e) => e,
        }
    }
}

/// Create a user after validating the credentials format
pub async fn signup(
    store: &dyn Store,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<UserRecord, AuthError> {
    if !UserRecord::validate_username(username) {
        return Err(AuthError::InvalidFormat(ERR_INVALID_USERNAME));
    }
    if !UserRecord::validate_password(password) {
        return Err(AuthError::InvalidFormat(ERR_PASSWORD_TOO_SHORT));
    }

    let path = user_path(username);
    if store.get(&path).await?.is_some() {
        tracing::info!("Signup rejected, user already exists: {}", username);
        return Err(AuthError::AlreadyExists);
    }

    let now = Utc::now();
    let record = UserRecord {
        username: username.to_string(),
        password_hash: hash_password(password, bcrypt_cost).await?,
        created_at: now,
        updated_at: now,
    };

    let value = serde_json::to_value(&record).map_err(StoreError::from)?;
    store.set(&path, value).await?;

    tracing::info!("New user registered: {}", username);
    Ok(record)
}

/// Check credentials; returns the stored (original) username
pub async fn login(store: &dyn Store, username: &str, password: &str) -> Result<String, AuthError> {
    let value = store
        .get(&user_path(username))
        .await?
        .ok_or(AuthError::NotFound)?;
    let record: UserRecord = serde_json::from_value(value).map_err(StoreError::from)?;

    if !verify_password(password, &record.password_hash).await? {
        tracing::warn!("Failed login for {}", username);
        return Err(AuthError::InvalidCredentials);
    }

    tracing::info!("User logged in: {}", record.username);
    Ok(record.username)
}
