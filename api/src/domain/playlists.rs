//! Playlist domain - models and DB queries for playlists
//!
//! Playlist membership lives in `playlist_videos` keyed by (playlist_id, video_id),
//! so a video can appear at most once per playlist. `position` keeps insertion order.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use super::PageRequest;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Playlist {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    /// Video ids in playlist order
    pub video_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct PlaylistChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PlaylistChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

pub async fn insert_playlist<'e, E>(
    executor: E,
    owner_id: i64,
    name: &str,
    description: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO playlists (owner_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// Get a playlist with its ordered video ids
pub async fn get_playlist_by_id<'e, E>(
    executor: E,
    playlist_id: i64,
) -> Result<Option<Playlist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT p.id, p.owner_id, p.name, p.description,
               COALESCE(
                   (SELECT array_agg(pv.video_id ORDER BY pv.position, pv.added_at)
                    FROM playlist_videos pv WHERE pv.playlist_id = p.id),
                   '{}'
               ) AS video_ids,
               p.created_at, p.updated_at
        FROM playlists p
        WHERE p.id = $1
        "#,
    )
    .bind(playlist_id)
    .fetch_optional(executor)
    .await
}

/// List one page of a user's playlists, newest first
pub async fn list_playlists_by_owner<'e, E>(
    executor: E,
    owner_id: i64,
    page: PageRequest,
) -> Result<Vec<Playlist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT p.id, p.owner_id, p.name, p.description,
               COALESCE(
                   (SELECT array_agg(pv.video_id ORDER BY pv.position, pv.added_at)
                    FROM playlist_videos pv WHERE pv.playlist_id = p.id),
                   '{}'
               ) AS video_ids,
               p.created_at, p.updated_at
        FROM playlists p
        WHERE p.owner_id = $1
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(executor)
    .await
}

/// Append a video to a playlist. Returns false if it was already present.
pub async fn add_playlist_video<'e, E>(
    executor: E,
    playlist_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id, position)
        SELECT $1, $2, COALESCE(MAX(position), 0) + 1
        FROM playlist_videos
        WHERE playlist_id = $1
        ON CONFLICT (playlist_id, video_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a video from a playlist. Returns false if it was not present.
pub async fn remove_playlist_video<'e, E>(
    executor: E,
    playlist_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2",
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Bump updated_at after a membership change
pub async fn touch_playlist<'e, E>(executor: E, playlist_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
        .bind(playlist_id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Apply a partial update. Returns false if the playlist does not exist.
pub async fn update_playlist<'e, E>(
    executor: E,
    playlist_id: i64,
    changes: &PlaylistChanges,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE playlists
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(playlist_id)
    .bind(&changes.name)
    .bind(&changes.description)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_playlist<'e, E>(executor: E, playlist_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(playlist_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
