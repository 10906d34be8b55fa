//! Channel dashboard endpoints (/dashboard)

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::dto::VideoResponse;
use crate::AppState;
use crate::domain::dashboard::ChannelStats;
use crate::services::dashboard;
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/stats", get(channel_stats))
        .route("/dashboard/videos", get(channel_videos))
}

#[derive(Serialize)]
struct ChannelVideosResponse {
    videos: Vec<VideoResponse>,
}

/// GET /dashboard/stats - Likes, views, subscribers and video count for the caller
async fn channel_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ChannelStats>, ApiError> {
    Ok(Json(dashboard::channel_stats(state.store.as_ref(), user_id).await?))
}

/// GET /dashboard/videos - Every video the caller owns, newest first
async fn channel_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ChannelVideosResponse>, ApiError> {
    let videos = dashboard::channel_videos(state.store.as_ref(), user_id).await?;
    Ok(Json(ChannelVideosResponse {
        videos: videos.into_iter().map(VideoResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_zero_video_channel() {
        let app = test_app();
        let (status, body) = app.call("GET", "/dashboard/stats", Some(3), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "totalLikes": 0,
                "viewsCount": 0,
                "subscriberCount": 0,
                "totalVideos": 0
            })
        );

        let (status, body) = app.call("GET", "/dashboard/videos", Some(3), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "videos": [] }));
    }
}
