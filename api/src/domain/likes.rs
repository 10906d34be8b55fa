//! Like domain - like rows and their DB queries
//!
//! A like row exists exactly while the user likes the target; there is no flag.
//! Uniqueness per (liked_by, target) is enforced by partial unique indexes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, Postgres};

/// The thing being liked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Video(i64),
    Comment(i64),
    Tweet(i64),
}

impl LikeTarget {
    pub fn id(&self) -> i64 {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LikedVideo {
    pub video_id: i64,
    pub liked_at: DateTime<Utc>,
}

/// Remove the user's like on a target. Returns true if a row was deleted.
pub async fn delete_like<'e, E>(executor: E, liked_by: i64, target: LikeTarget) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        "DELETE FROM likes WHERE liked_by = $1 AND {} = $2",
        target.column()
    );

    let result = sqlx::query(&query)
        .bind(liked_by)
        .bind(target.id())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert a like unless one already exists.
/// Returns false when a concurrent request inserted the same like first.
pub async fn insert_like<'e, E>(executor: E, liked_by: i64, target: LikeTarget) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        "INSERT INTO likes (liked_by, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        target.column()
    );

    let result = sqlx::query(&query)
        .bind(liked_by)
        .bind(target.id())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Videos liked by a user, most recent like first
pub async fn list_liked_videos<'e, E>(executor: E, liked_by: i64) -> Result<Vec<LikedVideo>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT video_id, created_at AS liked_at
        FROM likes
        WHERE liked_by = $1 AND video_id IS NOT NULL
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(liked_by)
    .fetch_all(executor)
    .await
}
