use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{ERR_INVALID_VIDEO_ID, ERR_MISSING_VIDEO_FIELDS};
use crate::db::{upsert_record, StoreError};
use crate::error::{AppError, Result};
use crate::keys::{owner_videos_path, video_path, VideoOwner};
use crate::models::{sort_newest_first, Hotcues, VideoRecord};
use crate::routes::validation::{check_username, non_blank, require_username};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVideoRequest {
    pub youtube_url: Option<String>,
    pub video_id: Option<String>,
    #[serde(default)]
    pub hotcues: Hotcues,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVideoResponse {
    pub success: bool,
    pub video_id: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVideoResponse {
    pub success: bool,
    pub video_id: String,
}

fn check_video_id(video_id: &str) -> Result<()> {
    if !VideoRecord::validate_video_id(video_id) {
        return Err(AppError::InvalidInput(ERR_INVALID_VIDEO_ID.to_string()));
    }
    Ok(())
}

fn decode_record(value: Value) -> Result<VideoRecord> {
    serde_json::from_value(value).map_err(|e| AppError::Store(StoreError::from(e)))
}

/// Save or update a video and its hotcues
///
/// The whole record is replaced on every save, hotcues included; only
/// `createdAt` survives from the previous version.
pub async fn save_video(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SaveVideoRequest>, JsonRejection>,
) -> Result<Json<SaveVideoResponse>> {
    let Json(payload) = payload?;

    let (video_id, youtube_url) =
        match (non_blank(payload.video_id), non_blank(payload.youtube_url)) {
            (Some(video_id), Some(youtube_url)) => (video_id, youtube_url),
            _ => {
                return Err(AppError::InvalidInput(
                    ERR_MISSING_VIDEO_FIELDS.to_string(),
                ))
            }
        };
    check_video_id(&video_id)?;

    let username = non_blank(payload.username);
    if let Some(username) = &username {
        check_username(username)?;
    }
    VideoRecord::validate_hotcues(&payload.hotcues).map_err(AppError::InvalidInput)?;

    let title = state.titles.resolve(&video_id).await;

    let owner = VideoOwner::from_username(username.as_deref());
    let incoming = VideoRecord {
        video_id: video_id.clone(),
        youtube_url,
        title: title.title().to_string(),
        hotcues: payload.hotcues,
        username: owner.username().map(str::to_string),
        created_at: None,
        updated_at: None,
    };

    let fields = match serde_json::to_value(&incoming).map_err(StoreError::from)? {
        Value::Object(fields) => fields,
        _ => return Err(AppError::Internal("video record is not an object".to_string())),
    };

    let path = video_path(&owner, &video_id);
    let saved = upsert_record(state.db.as_ref(), &path, fields).await?;
    let saved = decode_record(Value::Object(saved))?;

    tracing::info!(
        "Video {} saved for {} with {} hotcues",
        video_id,
        owner.segment(),
        saved.hotcues.len()
    );

    Ok(Json(SaveVideoResponse {
        success: true,
        video_id,
        saved_at: saved.updated_at.unwrap_or_else(Utc::now),
    }))
}

/// List a user's videos, newest first
pub async fn list_videos(
    State(state): State<AppState>,
    params: std::result::Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<Vec<VideoRecord>>> {
    let Query(params) = params?;
    let username = require_username(params.username)?;
    let owner = VideoOwner::User(username);

    let children = state.db.children(&owner_videos_path(&owner)).await?;

    let mut videos: Vec<VideoRecord> = children
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping undecodable video {}: {}", key, e);
                None
            }
        })
        .collect();
    sort_newest_first(&mut videos);

    tracing::debug!("Listed {} videos for {}", videos.len(), owner.segment());

    Ok(Json(videos))
}

/// Fetch one video
///
/// Without `username` the shared namespace is read.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    params: std::result::Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<VideoRecord>> {
    let Query(params) = params?;
    let username = non_blank(params.username);
    if let Some(username) = &username {
        check_username(username)?;
    }
    check_video_id(&video_id)?;

    let owner = VideoOwner::from_username(username.as_deref());
    let value = state
        .db
        .get(&video_path(&owner, &video_id))
        .await?
        .ok_or_else(|| AppError::VideoNotFound(video_id.clone()))?;

    Ok(Json(decode_record(value)?))
}

/// Delete one of a user's videos
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    params: std::result::Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<DeleteVideoResponse>> {
    let Query(params) = params?;
    let username = require_username(params.username)?;
    check_video_id(&video_id)?;

    let owner = VideoOwner::User(username);
    let path = video_path(&owner, &video_id);

    if state.db.get(&path).await?.is_none() {
        return Err(AppError::VideoNotFound(video_id));
    }
    state.db.delete(&path).await?;

    tracing::info!("Video {} deleted for {}", video_id, owner.segment());

    Ok(Json(DeleteVideoResponse {
        success: true,
        video_id,
    }))
}
