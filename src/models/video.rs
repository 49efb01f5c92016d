use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{RESERVED_KEY_CHARS, VIDEO_ID_MAX_LEN};

/// Cue name -> position in seconds
pub type Hotcues = BTreeMap<String, f64>;

/// Video record stored at `videos/<ownerSegment>/<videoId>`
///
/// Timestamps are optional so records written before they existed still
/// decode; every save through the upsert path fills both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    pub youtube_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hotcues: Hotcues,
    /// Original, unencoded username of the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// A video id is 1-64 of `[A-Za-z0-9_-]`, a path segment as is
    pub fn validate_video_id(video_id: &str) -> bool {
        !video_id.is_empty()
            && video_id.len() <= VIDEO_ID_MAX_LEN
            && video_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// Hotcue names become keys in the stored tree; positions are seconds
    pub fn validate_hotcues(hotcues: &Hotcues) -> Result<(), String> {
        for (name, position) in hotcues {
            if name.trim().is_empty() || name.contains(RESERVED_KEY_CHARS) {
                return Err(format!("Invalid hotcue name: {:?}", name));
            }
            if !position.is_finite() || *position < 0.0 {
                return Err(format!(
                    "Hotcue {:?} must be a non-negative number of seconds",
                    name
                ));
            }
        }
        Ok(())
    }

    /// Ordering key for listings: creation time, else last update
    fn recency(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.updated_at)
    }
}

/// Sort newest first; records with no timestamps go last
pub fn sort_newest_first(records: &mut [VideoRecord]) {
    records.sort_by(|a, b| b.recency().cmp(&a.recency()));
}
