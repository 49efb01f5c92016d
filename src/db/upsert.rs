//! Create-or-update writes that keep a record's original creation time.
//!
//! Every upsert is one read followed by one whole-value write. Nothing guards
//! against a concurrent writer on the same path: two first saves racing each
//! other both stamp a fresh `createdAt` and the later write wins.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::{Store, StoreResult};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// RFC 3339 in UTC with a `Z` suffix, as chrono serializes `DateTime<Utc>`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Apply the timestamp policy to an incoming record
///
/// `createdAt` is carried over from `existing` when it holds a non-null
/// value, otherwise it becomes `now`. `updatedAt` is always `now`. Every other
/// field comes from `incoming` only; nested maps are replaced, not merged.
pub fn stamp_record(
    existing: Option<&Value>,
    mut incoming: Map<String, Value>,
    now: DateTime<Utc>,
) -> Map<String, Value> {
    let now = Value::String(format_timestamp(now));

    let created_at = existing
        .and_then(|value| value.get(CREATED_AT))
        .filter(|created| !created.is_null())
        .cloned()
        .unwrap_or_else(|| now.clone());

    incoming.insert(CREATED_AT.to_string(), created_at);
    incoming.insert(UPDATED_AT.to_string(), now);
    incoming
}

/// Read the node at `path`, stamp `incoming`, write it back and return it
pub async fn upsert_record(
    store: &dyn Store,
    path: &str,
    incoming: Map<String, Value>,
) -> StoreResult<Map<String, Value>> {
    let existing = store.get(path).await?;
    let is_update = existing.is_some();

    let record = stamp_record(existing.as_ref(), incoming, Utc::now());
    store.set(path, Value::Object(record.clone())).await?;

    tracing::debug!(
        "Upserted {} ({})",
        path,
        if is_update { "update" } else { "create" }
    );

    Ok(record)
}
