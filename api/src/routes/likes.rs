//! Like endpoints (/likes)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::path_id;
use crate::AppState;
use crate::domain::likes::{LikeTarget, LikedVideo};
use crate::services::error::ApiError;
use crate::services::likes;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/likes/toggle/v/{video_id}", post(toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(toggle_tweet_like))
        .route("/likes/videos", get(liked_videos))
}

#[derive(Serialize)]
struct LikeResponse {
    message: &'static str,
    liked: bool,
}

async fn toggle(state: &AppState, user_id: i64, target: LikeTarget) -> Result<Json<LikeResponse>, ApiError> {
    let liked = likes::toggle_like(state.store.as_ref(), user_id, target)
        .await?
        .is_added();

    Ok(Json(LikeResponse {
        message: if liked {
            "Liked successfully"
        } else {
            "Unliked successfully"
        },
        liked,
    }))
}

/// POST /likes/toggle/v/{video_id}
async fn toggle_video_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    toggle(&state, user_id, LikeTarget::Video(video_id)).await
}

/// POST /likes/toggle/c/{comment_id}
async fn toggle_comment_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let comment_id = path_id(&comment_id, "comment id")?;
    toggle(&state, user_id, LikeTarget::Comment(comment_id)).await
}

/// POST /likes/toggle/t/{tweet_id}
async fn toggle_tweet_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let tweet_id = path_id(&tweet_id, "tweet id")?;
    toggle(&state, user_id, LikeTarget::Tweet(tweet_id)).await
}

/// GET /likes/videos - Videos liked by the caller, newest like first
async fn liked_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<LikedVideo>>, ApiError> {
    Ok(Json(likes::liked_videos(state.store.as_ref(), user_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_like_twice_reports_both_states() {
        let app = test_app();
        let (_, tweet) = app
            .call("POST", "/tweets", Some(1), Some(json!({ "content": "like me" })))
            .await;
        let uri = format!("/likes/toggle/t/{}", tweet["id"]);

        let (status, body) = app.call("POST", &uri, Some(2), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Liked successfully");
        assert_eq!(body["liked"], true);

        let (status, body) = app.call("POST", &uri, Some(2), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Unliked successfully");
        assert_eq!(body["liked"], false);
        assert_eq!(app.store.like_count().await, 0);
    }

    #[tokio::test]
    async fn test_like_missing_video() {
        let app = test_app();
        let (status, body) = app.call("POST", "/likes/toggle/v/31", Some(1), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Video not found");

        let (status, _) = app.call("POST", "/likes/toggle/v/x", Some(1), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
