use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

/// User record stored at `users/<encodedUsername>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Original, unencoded username
    pub username: String,
    /// bcrypt hash (salt and cost embedded)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Validate a username: 3-20 ASCII letters, digits or underscores
    pub fn validate_username(username: &str) -> bool {
        (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len())
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Validate a password: at least 6 characters
    pub fn validate_password(password: &str) -> bool {
        password.chars().count() >= PASSWORD_MIN_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(UserRecord::validate_username("abc_123"));
        assert!(UserRecord::validate_username("abc"));
        assert!(UserRecord::validate_username(&"a".repeat(20)));

        // Too short
        assert!(!UserRecord::validate_username("ab"));

        // Too long
        assert!(!UserRecord::validate_username(&"a".repeat(21)));

        // Invalid characters
        assert!(!UserRecord::validate_username("first.last"));
        assert!(!UserRecord::validate_username("me@host"));
        assert!(!UserRecord::validate_username("has space"));
        assert!(!UserRecord::validate_username("héllo"));
    }

    #[test]
    fn test_validate_password() {
        assert!(!UserRecord::validate_password("12345"));
        assert!(UserRecord::validate_password("123456"));
        assert!(!UserRecord::validate_password(""));
    }

    #[test]
    fn test_record_field_names() {
        let record = UserRecord {
            username: "bob".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["passwordHash"], "hash");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
