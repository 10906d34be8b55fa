//! Like toggling and liked-video listing

use tracing::debug;

use crate::domain::ToggleOutcome;
use crate::domain::likes::{LikeTarget, LikedVideo};
use crate::services::error::ApiError;
use crate::store::Store;

async fn ensure_target_exists(store: &dyn Store, target: LikeTarget) -> Result<(), ApiError> {
    let exists = match target {
        LikeTarget::Video(id) => store.get_video(id).await?.is_some(),
        LikeTarget::Comment(id) => store.get_comment(id).await?.is_some(),
        LikeTarget::Tweet(id) => store.get_tweet(id).await?.is_some(),
    };
    if exists {
        Ok(())
    } else {
        Err(match target {
            LikeTarget::Video(_) => ApiError::not_found("Video not found"),
            LikeTarget::Comment(_) => ApiError::not_found("Comment not found"),
            LikeTarget::Tweet(_) => ApiError::not_found("Tweet not found"),
        })
    }
}

/// Like the target if the actor has not, otherwise remove the like
pub async fn toggle_like(
    store: &dyn Store,
    actor: i64,
    target: LikeTarget,
) -> Result<ToggleOutcome, ApiError> {
    ensure_target_exists(store, target).await?;
    let outcome = store.toggle_like(actor, target).await?;
    debug!(actor, kind = target.kind(), target_id = target.id(), ?outcome, "Like toggled");
    Ok(outcome)
}

pub async fn liked_videos(store: &dyn Store, actor: i64) -> Result<Vec<LikedVideo>, ApiError> {
    Ok(store.list_liked_videos(actor).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_store;

    #[tokio::test]
    async fn test_toggle_twice_is_identity() {
        let store = seeded_store();
        let tweet = store.insert_tweet(1, "like me").await.unwrap();
        let target = LikeTarget::Tweet(tweet.id);

        assert_eq!(toggle_like(&store, 2, target).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(store.like_count().await, 1);
        assert_eq!(toggle_like(&store, 2, target).await.unwrap(), ToggleOutcome::Removed);
        assert_eq!(store.like_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_target() {
        let store = seeded_store();
        let err = toggle_like(&store, 1, LikeTarget::Comment(77)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(store.like_count().await, 0);
    }

    #[tokio::test]
    async fn test_liked_videos_only_lists_videos() {
        let store = seeded_store();
        let video = store
            .insert_video(crate::domain::videos::NewVideo {
                owner_id: 1,
                title: "t".into(),
                description: "d".into(),
                video_url: "u".into(),
                video_public_id: "p".into(),
                thumbnail_url: None,
                thumbnail_public_id: None,
                duration_secs: 3.0,
            })
            .await
            .unwrap();
        let tweet = store.insert_tweet(1, "t").await.unwrap();

        toggle_like(&store, 2, LikeTarget::Video(video.id)).await.unwrap();
        toggle_like(&store, 2, LikeTarget::Tweet(tweet.id)).await.unwrap();

        let liked = liked_videos(&store, 2).await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].video_id, video.id);
    }
}
