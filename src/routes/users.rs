use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::constants::ERR_MISSING_CREDENTIALS;
use crate::error::{AppError, Result};
use crate::routes::validation::non_blank;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> Result<(String, String)> {
        match (non_blank(self.username), self.password.filter(|p| !p.is_empty())) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::InvalidInput(ERR_MISSING_CREDENTIALS.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub username: String,
}

/// Register a new user
///
/// Returns 201 on success, 400 when the username or password breaks the
/// format rules and 409 when the username is taken.
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let (username, password) = payload.into_parts()?;

    let record = auth::signup(
        state.db.as_ref(),
        &username,
        &password,
        state.config.bcrypt_cost,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            username: record.username,
        }),
    ))
}

/// Verify credentials
///
/// Unknown users and wrong passwords both answer 401.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let (username, password) = payload.into_parts()?;

    let username = auth::login(state.db.as_ref(), &username, &password).await?;

    Ok(Json(AuthResponse {
        success: true,
        username,
    }))
}
