//! Best-effort video title lookup.
//!
//! A failed lookup never fails a save: callers get [`ResolvedTitle::Fallback`]
//! and store [`FALLBACK_TITLE`] instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::constants::FALLBACK_TITLE;

/// Outcome of a title lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTitle {
    Resolved(String),
    Fallback { reason: String },
}

impl ResolvedTitle {
    /// Title to store
    pub fn title(&self) -> &str {
        match self {
            ResolvedTitle::Resolved(title) => title,
            ResolvedTitle::Fallback { .. } => FALLBACK_TITLE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolvedTitle::Fallback { .. })
    }
}

#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve(&self, video_id: &str) -> ResolvedTitle;
}

#[derive(Error, Debug)]
enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup responded with status {0}")]
    Status(u16),

    #[error("response carried no title")]
    MissingTitle,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

/// oEmbed lookup against a YouTube-compatible endpoint
pub struct OEmbedResolver {
    client: Client,
    endpoint: String,
}

impl OEmbedResolver {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn lookup(&self, video_id: &str) -> Result<String, LookupError> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body: OEmbedResponse = response.json().await?;
        body.title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or(LookupError::MissingTitle)
    }
}

#[async_trait]
impl TitleResolver for OEmbedResolver {
    async fn resolve(&self, video_id: &str) -> ResolvedTitle {
        match self.lookup(video_id).await {
            Ok(title) => ResolvedTitle::Resolved(title),
            Err(e) => {
                tracing::warn!("Title lookup for {} fell back: {}", video_id, e);
                ResolvedTitle::Fallback {
                    reason: e.to_string(),
                }
            }
        }
    }
}
