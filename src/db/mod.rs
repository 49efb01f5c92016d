pub mod local;
pub mod remote;
pub mod upsert;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::StoreBackend;

pub use local::RedbStore;
pub use remote::RemoteStore;
pub use upsert::{stamp_record, upsert_record};

/// Store handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<dyn Store>;

/// Failures reported by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Open error: {0}")]
    Open(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Hierarchical key-value tree addressed by `/`-separated paths.
///
/// Writes are last-write-wins; there is no compare-and-set.
#[async_trait]
pub trait Store: Send + Sync {
    /// Value stored exactly at `path`
    async fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Replace the node at `path` and everything beneath it
    async fn set(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Remove the node at `path` and everything beneath it
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Direct children of `path` in key order
    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>>;
}

/// Open the backend selected by configuration
pub fn open_store(backend: &StoreBackend) -> StoreResult<Db> {
    match backend {
        StoreBackend::Local { path } => Ok(Arc::new(RedbStore::open(path)?)),
        StoreBackend::Remote { url, auth_token } => {
            Ok(Arc::new(RemoteStore::new(url.clone(), auth_token.clone())?))
        }
    }
}

/// Reject paths with empty segments
pub(crate) fn check_path(path: &str) -> StoreResult<()> {
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path() {
        assert!(check_path("users/bob").is_ok());
        assert!(check_path("videos/-shared/abc").is_ok());
        assert!(check_path("").is_err());
        assert!(check_path("users//bob").is_err());
        assert!(check_path("/users").is_err());
        assert!(check_path("users/").is_err());
    }
}
