//! In-process store with the same semantics as the PostgreSQL schema:
//! reference checks, unique relationship rows and cascading deletes.
//! Every check-then-act sequence runs under a single write lock.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::domain::comments::Comment;
use crate::domain::dashboard::ChannelStats;
use crate::domain::likes::{LikeTarget, LikedVideo};
use crate::domain::playlists::{Playlist, PlaylistChanges};
use crate::domain::subscriptions::{SubscribedChannel, Subscriber};
use crate::domain::tweets::Tweet;
use crate::domain::users::User;
use crate::domain::videos::{NewVideo, Video, VideoChanges, VideoFilter};
use crate::domain::{PageRequest, ToggleOutcome};

#[derive(Debug, Clone)]
struct LikeRow {
    liked_by: i64,
    target: LikeTarget,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SubscriptionRow {
    subscriber_id: i64,
    channel_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    videos: BTreeMap<i64, Video>,
    comments: BTreeMap<i64, Comment>,
    tweets: BTreeMap<i64, Tweet>,
    likes: BTreeMap<i64, LikeRow>,
    subscriptions: BTreeMap<i64, SubscriptionRow>,
    playlists: BTreeMap<i64, Playlist>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn require_user(&self, user_id: i64) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference)
        }
    }

    fn target_exists(&self, target: LikeTarget) -> bool {
        match target {
            LikeTarget::Video(id) => self.videos.contains_key(&id),
            LikeTarget::Comment(id) => self.comments.contains_key(&id),
            LikeTarget::Tweet(id) => self.tweets.contains_key(&id),
        }
    }

    fn remove_likes_on(&mut self, targets: &HashSet<LikeTarget>) {
        self.likes.retain(|_, like| !targets.contains(&like.target));
    }

    fn insert_user(&mut self, username: &str, email: &str, full_name: &str) -> User {
        let id = self.next_id();
        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one user per username (ids 1..=n)
    pub fn with_users<S: AsRef<str>>(usernames: &[S]) -> Self {
        let mut tables = Tables::default();
        for name in usernames {
            let name = name.as_ref();
            tables.insert_user(name, &format!("{}@vidtube.local", name), name);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Bump a video's view counter (views are not otherwise mutable through the API)
    pub async fn add_views(&self, video_id: i64, views: i64) {
        if let Some(video) = self.tables.write().await.videos.get_mut(&video_id) {
            video.views += views;
        }
    }

    /// Number of like rows, across all targets
    pub async fn like_count(&self) -> usize {
        self.tables.read().await.likes.len()
    }

    /// Number of subscription rows
    pub async fn subscription_count(&self) -> usize {
        self.tables.read().await.subscriptions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(video.owner_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let video = Video {
            id,
            owner_id: video.owner_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            video_public_id: video.video_public_id,
            thumbnail_url: video.thumbnail_url,
            thumbnail_public_id: video.thumbnail_public_id,
            duration_secs: video.duration_secs,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        tables.videos.insert(id, video.clone());
        Ok(video)
    }

    async fn get_video(&self, video_id: i64) -> Result<Option<Video>, StoreError> {
        Ok(self.tables.read().await.videos.get(&video_id).cloned())
    }

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> Result<(Vec<Video>, i64), StoreError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        matching.sort_by(|a, b| filter.compare(a, b));

        let total = matching.len() as i64;
        Ok((page.slice(&matching), total))
    }

    async fn list_videos_by_owner(&self, owner_id: i64) -> Result<Vec<Video>, StoreError> {
        let tables = self.tables.read().await;
        let mut owned: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn list_videos_by_ids(&self, ids: &[i64]) -> Result<Vec<Video>, StoreError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.videos.get(id).cloned())
            .collect())
    }

    async fn update_video(
        &self,
        video_id: i64,
        changes: VideoChanges,
    ) -> Result<Option<Video>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(video) = tables.videos.get_mut(&video_id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            video.title = title;
        }
        if let Some(description) = changes.description {
            video.description = description;
        }
        if let Some(url) = changes.thumbnail_url {
            video.thumbnail_url = Some(url);
        }
        if let Some(public_id) = changes.thumbnail_public_id {
            video.thumbnail_public_id = Some(public_id);
        }
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn toggle_video_published(&self, video_id: i64) -> Result<Option<Video>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.videos.get_mut(&video_id).map(|video| {
            video.is_published = !video.is_published;
            video.updated_at = Utc::now();
            video.clone()
        }))
    }

    async fn delete_video(&self, video_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.videos.remove(&video_id).is_none() {
            return Ok(false);
        }

        let mut liked_targets = HashSet::from([LikeTarget::Video(video_id)]);
        tables.comments.retain(|id, comment| {
            if comment.video_id == video_id {
                liked_targets.insert(LikeTarget::Comment(*id));
                false
            } else {
                true
            }
        });
        tables.remove_likes_on(&liked_targets);
        for playlist in tables.playlists.values_mut() {
            playlist.video_ids.retain(|id| *id != video_id);
        }
        Ok(true)
    }

    async fn insert_comment(
        &self,
        video_id: i64,
        owner_id: i64,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(owner_id)?;
        if !tables.videos.contains_key(&video_id) {
            return Err(StoreError::MissingReference);
        }

        let id = tables.next_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            video_id,
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, StoreError> {
        Ok(self.tables.read().await.comments.get(&comment_id).cloned())
    }

    async fn list_comments(
        &self,
        video_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        // BTreeMap iteration is id order, which is insertion order
        let comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect();
        Ok(page.slice(&comments))
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.get_mut(&comment_id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.comments.remove(&comment_id).is_none() {
            return Ok(false);
        }
        tables.remove_likes_on(&HashSet::from([LikeTarget::Comment(comment_id)]));
        Ok(true)
    }

    async fn insert_tweet(&self, owner_id: i64, content: &str) -> Result<Tweet, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(owner_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let tweet = Tweet {
            id,
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.tweets.insert(id, tweet.clone());
        Ok(tweet)
    }

    async fn get_tweet(&self, tweet_id: i64) -> Result<Option<Tweet>, StoreError> {
        Ok(self.tables.read().await.tweets.get(&tweet_id).cloned())
    }

    async fn list_tweets_by_owner(&self, owner_id: i64) -> Result<Vec<Tweet>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tweets
            .values()
            .rev()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_tweet(&self, tweet_id: i64, content: &str) -> Result<Option<Tweet>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tweets.get_mut(&tweet_id).map(|tweet| {
            tweet.content = content.to_string();
            tweet.updated_at = Utc::now();
            tweet.clone()
        }))
    }

    async fn delete_tweet(&self, tweet_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.tweets.remove(&tweet_id).is_none() {
            return Ok(false);
        }
        tables.remove_likes_on(&HashSet::from([LikeTarget::Tweet(tweet_id)]));
        Ok(true)
    }

    async fn toggle_like(
        &self,
        liked_by: i64,
        target: LikeTarget,
    ) -> Result<ToggleOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .likes
            .iter()
            .find(|(_, like)| like.liked_by == liked_by && like.target == target)
            .map(|(id, _)| *id);

        if let Some(like_id) = existing {
            tables.likes.remove(&like_id);
            return Ok(ToggleOutcome::Removed);
        }

        tables.require_user(liked_by)?;
        if !tables.target_exists(target) {
            return Err(StoreError::MissingReference);
        }
        let id = tables.next_id();
        tables.likes.insert(
            id,
            LikeRow {
                liked_by,
                target,
                created_at: Utc::now(),
            },
        );
        Ok(ToggleOutcome::Added)
    }

    async fn list_liked_videos(&self, liked_by: i64) -> Result<Vec<LikedVideo>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .values()
            .rev()
            .filter(|like| like.liked_by == liked_by)
            .filter_map(|like| match like.target {
                LikeTarget::Video(video_id) => Some(LikedVideo {
                    video_id,
                    liked_at: like.created_at,
                }),
                _ => None,
            })
            .collect())
    }

    async fn toggle_subscription(
        &self,
        subscriber_id: i64,
        channel_id: i64,
    ) -> Result<ToggleOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .subscriptions
            .iter()
            .find(|(_, s)| s.subscriber_id == subscriber_id && s.channel_id == channel_id)
            .map(|(id, _)| *id);

        if let Some(subscription_id) = existing {
            tables.subscriptions.remove(&subscription_id);
            return Ok(ToggleOutcome::Removed);
        }

        tables.require_user(subscriber_id)?;
        tables.require_user(channel_id)?;
        let id = tables.next_id();
        tables.subscriptions.insert(
            id,
            SubscriptionRow {
                subscriber_id,
                channel_id,
                created_at: Utc::now(),
            },
        );
        Ok(ToggleOutcome::Added)
    }

    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<Subscriber>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .rev()
            .filter(|s| s.channel_id == channel_id)
            .map(|s| Subscriber {
                subscriber_id: s.subscriber_id,
                subscribed_at: s.created_at,
            })
            .collect())
    }

    async fn list_subscribed_channels(
        &self,
        subscriber_id: i64,
    ) -> Result<Vec<SubscribedChannel>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .rev()
            .filter(|s| s.subscriber_id == subscriber_id)
            .map(|s| SubscribedChannel {
                channel_id: s.channel_id,
                subscribed_at: s.created_at,
            })
            .collect())
    }

    async fn insert_playlist(
        &self,
        owner_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Playlist, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(owner_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let playlist = Playlist {
            id,
            owner_id,
            name: name.to_string(),
            description: description.to_string(),
            video_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.playlists.insert(id, playlist.clone());
        Ok(playlist)
    }

    async fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>, StoreError> {
        Ok(self.tables.read().await.playlists.get(&playlist_id).cloned())
    }

    async fn list_playlists_by_owner(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Playlist>, StoreError> {
        let tables = self.tables.read().await;
        let owned: Vec<Playlist> = tables
            .playlists
            .values()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(page.slice(&owned))
    }

    async fn add_playlist_video(&self, playlist_id: i64, video_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.videos.contains_key(&video_id) {
            return Err(StoreError::MissingReference);
        }
        let playlist = tables
            .playlists
            .get_mut(&playlist_id)
            .ok_or(StoreError::MissingReference)?;

        if playlist.video_ids.contains(&video_id) {
            return Ok(false);
        }
        playlist.video_ids.push(video_id);
        playlist.updated_at = Utc::now();
        Ok(true)
    }

    async fn remove_playlist_video(
        &self,
        playlist_id: i64,
        video_id: i64,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(playlist) = tables.playlists.get_mut(&playlist_id) else {
            return Ok(false);
        };

        let before = playlist.video_ids.len();
        playlist.video_ids.retain(|id| *id != video_id);
        let removed = playlist.video_ids.len() != before;
        if removed {
            playlist.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn update_playlist(
        &self,
        playlist_id: i64,
        changes: PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.playlists.get_mut(&playlist_id).map(|playlist| {
            if let Some(name) = changes.name {
                playlist.name = name;
            }
            if let Some(description) = changes.description {
                playlist.description = description;
            }
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }

    async fn delete_playlist(&self, playlist_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .write()
            .await
            .playlists
            .remove(&playlist_id)
            .is_some())
    }

    async fn channel_stats(&self, owner_id: i64) -> Result<ChannelStats, StoreError> {
        let tables = self.tables.read().await;
        let owned: HashSet<i64> = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.id)
            .collect();

        let total_likes = tables
            .likes
            .values()
            .filter(|like| matches!(like.target, LikeTarget::Video(id) if owned.contains(&id)))
            .count() as i64;
        let views_count = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| v.views)
            .sum();
        let subscriber_count = tables
            .subscriptions
            .values()
            .filter(|s| s.channel_id == owner_id)
            .count() as i64;

        Ok(ChannelStats {
            total_likes,
            views_count,
            subscriber_count,
            total_videos: owned.len() as i64,
        })
    }
}
