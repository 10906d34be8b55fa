//! PostgreSQL-backed store, delegating to the domain query functions

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Store, StoreError};
use crate::domain::comments::{self, Comment};
use crate::domain::dashboard::{self, ChannelStats};
use crate::domain::likes::{self, LikeTarget, LikedVideo};
use crate::domain::playlists::{self, Playlist, PlaylistChanges};
use crate::domain::subscriptions::{self, SubscribedChannel, Subscriber};
use crate::domain::tweets::{self, Tweet};
use crate::domain::users::{self, User};
use crate::domain::videos::{self, NewVideo, Video, VideoChanges, VideoFilter};
use crate::domain::{PageRequest, ToggleOutcome};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(users::get_user_by_id(&self.pool, user_id).await?)
    }

    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError> {
        Ok(videos::insert_video(&self.pool, &video).await?)
    }

    async fn get_video(&self, video_id: i64) -> Result<Option<Video>, StoreError> {
        Ok(videos::get_video_by_id(&self.pool, video_id).await?)
    }

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> Result<(Vec<Video>, i64), StoreError> {
        let total = videos::count_videos(&self.pool, filter).await?;
        let results = videos::list_videos_paginated(&self.pool, filter, page).await?;
        Ok((results, total))
    }

    async fn list_videos_by_owner(&self, owner_id: i64) -> Result<Vec<Video>, StoreError> {
        Ok(videos::list_videos_by_owner(&self.pool, owner_id).await?)
    }

    async fn list_videos_by_ids(&self, ids: &[i64]) -> Result<Vec<Video>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(videos::list_videos_by_ids(&self.pool, ids).await?)
    }

    async fn update_video(
        &self,
        video_id: i64,
        changes: VideoChanges,
    ) -> Result<Option<Video>, StoreError> {
        Ok(videos::update_video(&self.pool, video_id, &changes).await?)
    }

    async fn toggle_video_published(&self, video_id: i64) -> Result<Option<Video>, StoreError> {
        Ok(videos::toggle_video_published(&self.pool, video_id).await?)
    }

    async fn delete_video(&self, video_id: i64) -> Result<bool, StoreError> {
        Ok(videos::delete_video(&self.pool, video_id).await?)
    }

    async fn insert_comment(
        &self,
        video_id: i64,
        owner_id: i64,
        content: &str,
    ) -> Result<Comment, StoreError> {
        Ok(comments::insert_comment(&self.pool, video_id, owner_id, content).await?)
    }

    async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, StoreError> {
        Ok(comments::get_comment_by_id(&self.pool, comment_id).await?)
    }

    async fn list_comments(
        &self,
        video_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError> {
        Ok(comments::list_comments_for_video(&self.pool, video_id, page).await?)
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        Ok(comments::update_comment_content(&self.pool, comment_id, content).await?)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, StoreError> {
        Ok(comments::delete_comment(&self.pool, comment_id).await?)
    }

    async fn insert_tweet(&self, owner_id: i64, content: &str) -> Result<Tweet, StoreError> {
        Ok(tweets::insert_tweet(&self.pool, owner_id, content).await?)
    }

    async fn get_tweet(&self, tweet_id: i64) -> Result<Option<Tweet>, StoreError> {
        Ok(tweets::get_tweet_by_id(&self.pool, tweet_id).await?)
    }

    async fn list_tweets_by_owner(&self, owner_id: i64) -> Result<Vec<Tweet>, StoreError> {
        Ok(tweets::list_tweets_by_owner(&self.pool, owner_id).await?)
    }

    async fn update_tweet(&self, tweet_id: i64, content: &str) -> Result<Option<Tweet>, StoreError> {
        Ok(tweets::update_tweet_content(&self.pool, tweet_id, content).await?)
    }

    async fn delete_tweet(&self, tweet_id: i64) -> Result<bool, StoreError> {
        Ok(tweets::delete_tweet(&self.pool, tweet_id).await?)
    }

    async fn toggle_like(
        &self,
        liked_by: i64,
        target: LikeTarget,
    ) -> Result<ToggleOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome = if likes::delete_like(&mut *tx, liked_by, target).await? {
            ToggleOutcome::Removed
        } else {
            // A false insert means a concurrent toggle created the row first; it exists either way
            likes::insert_like(&mut *tx, liked_by, target).await?;
            ToggleOutcome::Added
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn list_liked_videos(&self, liked_by: i64) -> Result<Vec<LikedVideo>, StoreError> {
        Ok(likes::list_liked_videos(&self.pool, liked_by).await?)
    }

    async fn toggle_subscription(
        &self,
        subscriber_id: i64,
        channel_id: i64,
    ) -> Result<ToggleOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome =
            if subscriptions::delete_subscription(&mut *tx, subscriber_id, channel_id).await? {
                ToggleOutcome::Removed
            } else {
                subscriptions::insert_subscription(&mut *tx, subscriber_id, channel_id).await?;
                ToggleOutcome::Added
            };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<Subscriber>, StoreError> {
        Ok(subscriptions::list_subscribers(&self.pool, channel_id).await?)
    }

    async fn list_subscribed_channels(
        &self,
        subscriber_id: i64,
    ) -> Result<Vec<SubscribedChannel>, StoreError> {
        Ok(subscriptions::list_subscribed_channels(&self.pool, subscriber_id).await?)
    }

    async fn insert_playlist(
        &self,
        owner_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Playlist, StoreError> {
        let playlist_id = playlists::insert_playlist(&self.pool, owner_id, name, description).await?;
        playlists::get_playlist_by_id(&self.pool, playlist_id)
            .await?
            .ok_or(StoreError::MissingReference)
    }

    async fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>, StoreError> {
        Ok(playlists::get_playlist_by_id(&self.pool, playlist_id).await?)
    }

    async fn list_playlists_by_owner(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Playlist>, StoreError> {
        Ok(playlists::list_playlists_by_owner(&self.pool, owner_id, page).await?)
    }

    async fn add_playlist_video(&self, playlist_id: i64, video_id: i64) -> Result<bool, StoreError> {
        let added = playlists::add_playlist_video(&self.pool, playlist_id, video_id).await?;
        if added {
            playlists::touch_playlist(&self.pool, playlist_id).await?;
        }
        Ok(added)
    }

    async fn remove_playlist_video(
        &self,
        playlist_id: i64,
        video_id: i64,
    ) -> Result<bool, StoreError> {
        let removed = playlists::remove_playlist_video(&self.pool, playlist_id, video_id).await?;
        if removed {
            playlists::touch_playlist(&self.pool, playlist_id).await?;
        }
        Ok(removed)
    }

    async fn update_playlist(
        &self,
        playlist_id: i64,
        changes: PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError> {
        if !playlists::update_playlist(&self.pool, playlist_id, &changes).await? {
            return Ok(None);
        }
        Ok(playlists::get_playlist_by_id(&self.pool, playlist_id).await?)
    }

    async fn delete_playlist(&self, playlist_id: i64) -> Result<bool, StoreError> {
        Ok(playlists::delete_playlist(&self.pool, playlist_id).await?)
    }

    async fn channel_stats(&self, owner_id: i64) -> Result<ChannelStats, StoreError> {
        Ok(dashboard::get_channel_stats(&self.pool, owner_id).await?)
    }
}
