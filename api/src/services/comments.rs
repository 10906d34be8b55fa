//! Comment operations

use crate::domain::comments::Comment;
use crate::domain::{PageRequest, non_blank};
use crate::services::ensure_owner;
use crate::services::error::ApiError;
use crate::store::Store;

pub async fn list_comments(
    store: &dyn Store,
    video_id: i64,
    page: PageRequest,
) -> Result<Vec<Comment>, ApiError> {
    if store.get_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("Video not found"));
    }
    Ok(store.list_comments(video_id, page).await?)
}

pub async fn add_comment(
    store: &dyn Store,
    actor: i64,
    video_id: i64,
    content: Option<String>,
) -> Result<Comment, ApiError> {
    let content = non_blank(content).ok_or_else(|| ApiError::invalid("Content is required"))?;

    if store.get_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("Video not found"));
    }
    Ok(store.insert_comment(video_id, actor, &content).await?)
}

async fn owned_comment(store: &dyn Store, actor: i64, comment_id: i64) -> Result<Comment, ApiError> {
    let comment = store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    ensure_owner(comment.owner_id, actor, "You do not own this comment")?;
    Ok(comment)
}

pub async fn update_comment(
    store: &dyn Store,
    actor: i64,
    comment_id: i64,
    content: Option<String>,
) -> Result<Comment, ApiError> {
    let content = non_blank(content).ok_or_else(|| ApiError::invalid("Content is required"))?;
    owned_comment(store, actor, comment_id).await?;

    store
        .update_comment(comment_id, &content)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))
}

pub async fn delete_comment(store: &dyn Store, actor: i64, comment_id: i64) -> Result<(), ApiError> {
    owned_comment(store, actor, comment_id).await?;
    if !store.delete_comment(comment_id).await? {
        return Err(ApiError::not_found("Comment not found"));
    }
    Ok(())
}
