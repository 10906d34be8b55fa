//! Entity store abstraction
//!
//! Every service operation goes through [`Store`]. `PgStore` is the production
//! backend; `MemoryStore` keeps the same semantics in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::comments::Comment;
use crate::domain::dashboard::ChannelStats;
use crate::domain::likes::{LikeTarget, LikedVideo};
use crate::domain::playlists::{Playlist, PlaylistChanges};
use crate::domain::subscriptions::{SubscribedChannel, Subscriber};
use crate::domain::tweets::Tweet;
use crate::domain::users::User;
use crate::domain::videos::{NewVideo, Video, VideoChanges, VideoFilter};
use crate::domain::{PageRequest, ToggleOutcome};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Postgres `query_canceled`, raised when statement_timeout fires
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store call timed out")]
    Timeout,

    #[error("a referenced row does not exist")]
    MissingReference,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let timed_out = match &e {
            sqlx::Error::PoolTimedOut => true,
            sqlx::Error::Database(db) => db.code().as_deref() == Some(QUERY_CANCELED),
            _ => false,
        };
        let missing_reference = matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation());

        if timed_out {
            StoreError::Timeout
        } else if missing_reference {
            StoreError::MissingReference
        } else {
            StoreError::Database(e)
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    // videos
    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError>;
    async fn get_video(&self, video_id: i64) -> Result<Option<Video>, StoreError>;
    /// One page of matching videos plus the total number of matches
    async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> Result<(Vec<Video>, i64), StoreError>;
    async fn list_videos_by_owner(&self, owner_id: i64) -> Result<Vec<Video>, StoreError>;
    async fn list_videos_by_ids(&self, ids: &[i64]) -> Result<Vec<Video>, StoreError>;
    async fn update_video(
        &self,
        video_id: i64,
        changes: VideoChanges,
    ) -> Result<Option<Video>, StoreError>;
    async fn toggle_video_published(&self, video_id: i64) -> Result<Option<Video>, StoreError>;
    async fn delete_video(&self, video_id: i64) -> Result<bool, StoreError>;

    // comments
    async fn insert_comment(
        &self,
        video_id: i64,
        owner_id: i64,
        content: &str,
    ) -> Result<Comment, StoreError>;
    async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, StoreError>;
    async fn list_comments(
        &self,
        video_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn update_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, StoreError>;
    async fn delete_comment(&self, comment_id: i64) -> Result<bool, StoreError>;

    // tweets
    async fn insert_tweet(&self, owner_id: i64, content: &str) -> Result<Tweet, StoreError>;
    async fn get_tweet(&self, tweet_id: i64) -> Result<Option<Tweet>, StoreError>;
    async fn list_tweets_by_owner(&self, owner_id: i64) -> Result<Vec<Tweet>, StoreError>;
    async fn update_tweet(&self, tweet_id: i64, content: &str) -> Result<Option<Tweet>, StoreError>;
    async fn delete_tweet(&self, tweet_id: i64) -> Result<bool, StoreError>;

    // likes
    /// Atomically flip the (liked_by, target) like row
    async fn toggle_like(
        &self,
        liked_by: i64,
        target: LikeTarget,
    ) -> Result<ToggleOutcome, StoreError>;
    async fn list_liked_videos(&self, liked_by: i64) -> Result<Vec<LikedVideo>, StoreError>;

    // subscriptions
    /// Atomically flip the (subscriber, channel) subscription row
    async fn toggle_subscription(
        &self,
        subscriber_id: i64,
        channel_id: i64,
    ) -> Result<ToggleOutcome, StoreError>;
    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<Subscriber>, StoreError>;
    async fn list_subscribed_channels(
        &self,
        subscriber_id: i64,
    ) -> Result<Vec<SubscribedChannel>, StoreError>;

    // playlists
    async fn insert_playlist(
        &self,
        owner_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Playlist, StoreError>;
    async fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>, StoreError>;
    async fn list_playlists_by_owner(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Playlist>, StoreError>;
    /// Returns false when the video was already in the playlist
    async fn add_playlist_video(&self, playlist_id: i64, video_id: i64) -> Result<bool, StoreError>;
    /// Returns false when the video was not in the playlist
    async fn remove_playlist_video(
        &self,
        playlist_id: i64,
        video_id: i64,
    ) -> Result<bool, StoreError>;
    async fn update_playlist(
        &self,
        playlist_id: i64,
        changes: PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError>;
    async fn delete_playlist(&self, playlist_id: i64) -> Result<bool, StoreError>;

    // dashboard
    async fn channel_stats(&self, owner_id: i64) -> Result<ChannelStats, StoreError>;
}
