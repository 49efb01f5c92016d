use crate::constants::{ERR_INVALID_USERNAME, ERR_MISSING_USERNAME};
use crate::error::{AppError, Result};
use crate::models::UserRecord;

/// Treat absent and blank values alike
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Owner username from a query string, required
pub fn require_username(username: Option<String>) -> Result<String> {
    let username =
        non_blank(username).ok_or_else(|| AppError::InvalidInput(ERR_MISSING_USERNAME.to_string()))?;
    check_username(&username)?;
    Ok(username)
}

/// Owner username, when given, must follow the signup rule
pub fn check_username(username: &str) -> Result<()> {
    if !UserRecord::validate_username(username) {
        return Err(AppError::InvalidInput(ERR_INVALID_USERNAME.to_string()));
    }
    Ok(())
}
