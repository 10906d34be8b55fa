//! Comment endpoints (/comments)

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::dto::MessageResponse;
use super::{PageQuery, path_id};
use crate::AppState;
use crate::domain::comments::Comment;
use crate::services::comments;
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comments/{video_id}", get(list_comments).post(add_comment))
        .route(
            "/comments/c/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: Option<String>,
}

/// GET /comments/{video_id} - Comments on a video, oldest first
async fn list_comments(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(video_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let Query(query) = query?;
    let page = query.page_request()?;

    let comments = comments::list_comments(state.store.as_ref(), video_id, page).await?;
    Ok(Json(comments))
}

/// POST /comments/{video_id}
async fn add_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let Json(req) = payload?;

    let comment = comments::add_comment(state.store.as_ref(), user_id, video_id, req.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /comments/c/{comment_id}
async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let comment_id = path_id(&comment_id, "comment id")?;
    let Json(req) = payload?;

    let comment =
        comments::update_comment(state.store.as_ref(), user_id, comment_id, req.content).await?;
    Ok(Json(comment))
}

/// DELETE /comments/c/{comment_id}
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comment_id = path_id(&comment_id, "comment id")?;
    comments::delete_comment(state.store.as_ref(), user_id, comment_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
