use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use std::time::Duration;

use super::{check_path, Store, StoreError, StoreResult};

/// Hosted JSON tree spoken over REST (`{url}/{path}.json`)
///
/// `null` bodies mean the node is absent. Subtree semantics (replace on
/// `PUT`, recursive `DELETE`) are provided by the host.
pub struct RemoteStore {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: String, auth_token: Option<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidPath(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(base_url.to_string()));
        }
        tracing::info!("Using remote store at {}", base_url);

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    /// `{base}/{segment}/.../{last}.json` with every segment percent-encoded
    fn node_url(&self, path: &str) -> StoreResult<Url> {
        check_path(path)?;
        let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if let Some(last) = segments.last_mut() {
            last.push_str(".json");
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidPath(path.to_string()))?
            .pop_if_empty()
            .extend(&segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::error!("Remote store responded {}: {}", status, message);
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Turn arrays back into index-keyed objects, dropping `null` holes
///
/// The host returns a node whose child keys are all small integers (`"0"`,
/// `"1"`, ...) as a JSON array; the tree itself only ever holds objects.
fn index_arrays(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(index, item)| (index.to_string(), index_arrays(item)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, index_arrays(item)))
                .collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let url = self.node_url(path)?;
        let response = self.send(self.client.get(url)).await?;
        let value: Value = response.json().await?;
        Ok(match value {
            Value::Null => None,
            other => Some(index_arrays(other)),
        })
    }

    async fn set(&self, path: &str, value: Value) -> StoreResult<()> {
        let url = self.node_url(path)?;
        self.send(self.client.put(url).json(&value)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let url = self.node_url(path)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        let mut children: Vec<(String, Value)> = match self.get(path).await? {
            Some(Value::Object(map)) => map.into_iter().collect(),
            Some(other) => {
                tracing::warn!("Remote node {} is a leaf, not a parent: {}", path, other);
                Vec::new()
            }
            None => Vec::new(),
        };
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Map};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    type Tree = Arc<Mutex<BTreeMap<String, Value>>>;

    const TOKEN: &str = "secret-token";

    fn authorized(params: &HashMap<String, String>) -> bool {
        params.get("auth").map(String::as_str) == Some(TOKEN)
    }

    fn strip(path: &str) -> String {
        path.trim_start_matches('/')
            .trim_end_matches(".json")
            .to_string()
    }

    /// Minimal in-process stand-in for the hosted tree, flat keyed by path
    async fn spawn_fake_tree() -> (String, Tree) {
        let tree: Tree = Arc::new(Mutex::new(BTreeMap::new()));

        async fn read(
            State(tree): State<Tree>,
            Path(path): Path<String>,
            Query(params): Query<HashMap<String, String>>,
        ) -> (StatusCode, Json<Value>) {
            if !authorized(&params) {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "denied"})));
            }
            let path = strip(&path);
            let tree = tree.lock().unwrap();
            if let Some(value) = tree.get(&path) {
                return (StatusCode::OK, Json(value.clone()));
            }
            let prefix = format!("{}/", path);
            let children: Map<String, Value> = tree
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(&prefix)
                        .filter(|rest| !rest.contains('/'))
                        .map(|rest| (rest.to_string(), value.clone()))
                })
                .collect();
            if children.is_empty() {
                (StatusCode::OK, Json(Value::Null))
            } else {
                (StatusCode::OK, Json(Value::Object(children)))
            }
        }

        async fn write(
            State(tree): State<Tree>,
            Path(path): Path<String>,
            Query(params): Query<HashMap<String, String>>,
            Json(value): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if !authorized(&params) {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "denied"})));
            }
            tree.lock().unwrap().insert(strip(&path), value.clone());
            (StatusCode::OK, Json(value))
        }

        async fn remove(
            State(tree): State<Tree>,
            Path(path): Path<String>,
            Query(params): Query<HashMap<String, String>>,
        ) -> (StatusCode, Json<Value>) {
            if !authorized(&params) {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "denied"})));
            }
            let path = strip(&path);
            let prefix = format!("{}/", path);
            tree.lock()
                .unwrap()
                .retain(|key, _| key != &path && !key.starts_with(&prefix));
            (StatusCode::OK, Json(Value::Null))
        }

        let app = Router::new()
            .route("/*path", get(read).put(write).delete(remove))
            .with_state(tree.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), tree)
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let (url, tree) = spawn_fake_tree().await;
        let store = RemoteStore::new(url, Some(TOKEN.to_string())).unwrap();

        store
            .set("users/bob", json!({"username": "bob"}))
            .await
            .unwrap();
        assert!(tree.lock().unwrap().contains_key("users/bob"));

        let value = store.get("users/bob").await.unwrap().unwrap();
        assert_eq!(value["username"], "bob");

        store.delete("users/bob").await.unwrap();
        assert!(store.get("users/bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_children() {
        let (url, _tree) = spawn_fake_tree().await;
        let store = RemoteStore::new(format!("{}/", url), Some(TOKEN.to_string())).unwrap();

        store.set("videos/bob/b", json!(2)).await.unwrap();
        store.set("videos/bob/a", json!(1)).await.unwrap();

        let children = store.children("videos/bob").await.unwrap();
        assert_eq!(
            children,
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );
        assert!(store.children("videos/alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_characters_stay_inside_the_key() {
        let (url, tree) = spawn_fake_tree().await;
        let store = RemoteStore::new(url, Some(TOKEN.to_string())).unwrap();

        store
            .set("videos/-shared/abc123", json!({"title": "original"}))
            .await
            .unwrap();
        store
            .set("videos/-shared/abc123?x", json!({"title": "other"}))
            .await
            .unwrap();
        store
            .set("videos/-shared/a b&c=%d", json!({"title": "odd"}))
            .await
            .unwrap();

        let keys: Vec<String> = tree.lock().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "videos/-shared/a b&c=%d".to_string(),
                "videos/-shared/abc123".to_string(),
                "videos/-shared/abc123?x".to_string(),
            ]
        );

        let original = store.get("videos/-shared/abc123").await.unwrap().unwrap();
        assert_eq!(original["title"], "original");

        store.delete("videos/-shared/abc123?x").await.unwrap();
        assert!(store.get("videos/-shared/abc123").await.unwrap().is_some());
        assert!(store.get("videos/-shared/abc123?x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_array_nodes_read_as_index_keyed_objects() {
        let (url, _tree) = spawn_fake_tree().await;
        let store = RemoteStore::new(url, Some(TOKEN.to_string())).unwrap();

        store
            .set(
                "videos/bob",
                json!([{"videoId": "0", "hotcues": [1.5, null, 3.0]}, null, {"videoId": "2"}]),
            )
            .await
            .unwrap();

        let children = store.children("videos/bob").await.unwrap();
        let keys: Vec<&str> = children.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["0", "2"]);
        assert_eq!(children[0].1["hotcues"], json!({"0": 1.5, "2": 3.0}));
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(RemoteStore::new("not a url".to_string(), None).is_err());
        assert!(RemoteStore::new("mailto:someone@example.com".to_string(), None).is_err());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (url, _tree) = spawn_fake_tree().await;
        let store = RemoteStore::new(url, Some("wrong".to_string())).unwrap();

        let result = store.get("users/bob").await;
        assert!(matches!(
            result,
            Err(StoreError::Status { status: 401, .. })
        ));
    }
}
