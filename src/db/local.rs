use async_trait::async_trait;
use redb::{Database, Error as RedbError, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::{check_path, Store, StoreResult};

/// Nodes table: full path -> JSON value (serialized)
///
/// Only nodes that were written directly have a row; interior nodes are
/// assembled from their descendants when read.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");

/// Embedded redb file standing in for the hosted tree
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the redb database at the given path
    ///
    /// Creates the nodes table on first run.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        tracing::info!("Opening local store at: {:?}", path.as_ref());

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    tracing::error!("Failed to create store directory: {}", e);
                    RedbError::Io(e)
                })?;
            }
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(NODES)?;
        }
        write_txn.commit()?;

        tracing::info!("Local store initialized successfully");

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

/// Key range covering every descendant of `path`
fn subtree_bounds(path: &str) -> (String, String) {
    // '0' is the byte right after '/'
    (format!("{}/", path), format!("{}0", path))
}

fn descendants(db: &Database, path: &str) -> StoreResult<Vec<(String, Value)>> {
    let (start, end) = subtree_bounds(path);
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(NODES)?;

    let mut entries = Vec::new();
    for item in table.range(start.as_str()..end.as_str())? {
        let (key, value) = item?;
        let relative = key.value()[start.len()..].to_string();
        entries.push((relative, serde_json::from_slice(value.value())?));
    }
    Ok(entries)
}

/// Place `value` at `segments` inside `node`, creating objects on the way
fn insert_nested(node: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            node.entry(last.to_string()).or_insert(value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_nested(child, rest, value);
            }
        }
    }
}

fn group_children(entries: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let mut grouped: BTreeMap<String, Value> = BTreeMap::new();
    for (relative, value) in entries {
        let segments: Vec<&str> = relative.split('/').collect();
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => continue,
        };
        if rest.is_empty() {
            grouped.entry(head.to_string()).or_insert(value);
        } else {
            let child = grouped
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_nested(child, rest, value);
            }
        }
    }
    grouped.into_iter().collect()
}

fn remove_subtree(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    path: &str,
) -> StoreResult<()> {
    let (start, end) = subtree_bounds(path);
    let keys: Vec<String> = table
        .range(start.as_str()..end.as_str())?
        .map(|item| item.map(|(key, _)| key.value().to_string()))
        .collect::<Result<_, _>>()?;

    for key in &keys {
        table.remove(key.as_str())?;
    }
    table.remove(path)?;
    Ok(())
}

#[async_trait]
impl Store for RedbStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        check_path(path)?;
        let path = path.to_string();

        self.blocking(move |db| {
            {
                let read_txn = db.begin_read()?;
                let table = read_txn.open_table(NODES)?;
                if let Some(bytes) = table.get(path.as_str())? {
                    return Ok(Some(serde_json::from_slice(bytes.value())?));
                }
            }

            let children = group_children(descendants(db, &path)?);
            if children.is_empty() {
                return Ok(None);
            }
            Ok(Some(Value::Object(children.into_iter().collect())))
        })
        .await
    }

    async fn set(&self, path: &str, value: Value) -> StoreResult<()> {
        check_path(path)?;
        let path = path.to_string();
        let bytes = serde_json::to_vec(&value)?;

        self.blocking(move |db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(NODES)?;
                remove_subtree(&mut table, &path)?;
                table.insert(path.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        check_path(path)?;
        let path = path.to_string();

        self.blocking(move |db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(NODES)?;
                remove_subtree(&mut table, &path)?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        check_path(path)?;
        let path = path.to_string();

        self.blocking(move |db| Ok(group_children(descendants(db, &path)?)))
            .await
    }
}
