//! Response DTOs shared by route modules

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::playlists::Playlist;
use crate::domain::videos::Video;
use crate::services::playlists::PopulatedPlaylist;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Video API response DTO
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // hosted asset ids intentionally omitted - internal use only
}

impl From<Video> for VideoResponse {
    fn from(v: Video) -> Self {
        Self {
            id: v.id,
            owner_id: v.owner_id,
            title: v.title,
            description: v.description,
            video_url: v.video_url,
            thumbnail_url: v.thumbnail_url,
            duration: v.duration_secs,
            views: v.views,
            is_published: v.is_published,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoMessageResponse {
    pub message: String,
    pub video: VideoResponse,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub video_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Playlist> for PlaylistResponse {
    fn from(p: Playlist) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            name: p.name,
            description: p.description,
            video_ids: p.video_ids,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Playlist with its videos resolved
#[derive(Debug, Serialize)]
pub struct PlaylistDetailResponse {
    #[serde(flatten)]
    pub playlist: PlaylistResponse,
    pub videos: Vec<VideoResponse>,
}

impl From<PopulatedPlaylist> for PlaylistDetailResponse {
    fn from(p: PopulatedPlaylist) -> Self {
        Self {
            playlist: p.playlist.into(),
            videos: p.videos.into_iter().map(VideoResponse::from).collect(),
        }
    }
}
