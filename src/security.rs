//! Password hashing.
//!
//! bcrypt embeds a random salt and the work factor in every hash, so the
//! stored string alone is enough to verify a later login. Both operations are
//! CPU bound and run on the blocking pool.

use crate::error::{AppError, Result};

/// Hash a password with the given bcrypt cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Check a password against a stored bcrypt hash
///
/// A malformed stored hash counts as a mismatch rather than a server error;
/// the account simply cannot log in until the hash is rewritten.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    let matches = tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &stored_hash).unwrap_or_else(|e| {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            false
        })
    })
    .await
    .map_err(AppError::TaskJoin)?;

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost bcrypt accepts; keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("hunter22", TEST_COST).await.unwrap();

        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).await.unwrap());
        assert!(!verify_password("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hash_password("same-password", TEST_COST).await.unwrap();
        let second = hash_password("same-password", TEST_COST).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cost_is_error() {
        let result = hash_password("password", 2).await;
        assert!(matches!(result, Err(AppError::PasswordHash(_))));
    }
}
