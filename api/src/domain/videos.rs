//! Video domain - models and DB queries for videos

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use super::PageRequest;

/// A published video
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    /// Hosted asset id of the video file (internal, used for deletion)
    pub video_public_id: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub duration_secs: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub duration_secs: f64,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
}

impl VideoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.thumbnail_url.is_none()
            && self.thumbnail_public_id.is_none()
    }
}

/// Sortable video columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Some(SortField::UpdatedAt),
            "views" => Some(SortField::Views),
            "duration" | "duration_secs" => Some(SortField::Duration),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Views => "views",
            SortField::Duration => "duration_secs",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for the video listing
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Case-insensitive substring matched against title and description
    pub query: Option<String>,
    pub owner_id: Option<i64>,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl VideoFilter {
    /// In-memory equivalent of the SQL WHERE clause
    pub fn matches(&self, video: &Video) -> bool {
        if let Some(owner_id) = self.owner_id {
            if video.owner_id != owner_id {
                return false;
            }
        }
        match &self.query {
            Some(q) => {
                let needle = q.to_lowercase();
                video.title.to_lowercase().contains(&needle)
                    || video.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    /// In-memory equivalent of the SQL ORDER BY clause (ties broken by id)
    pub fn compare(&self, a: &Video, b: &Video) -> std::cmp::Ordering {
        let ordering = match self.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Views => a.views.cmp(&b.views),
            SortField::Duration => a.duration_secs.total_cmp(&b.duration_secs),
            SortField::Title => a.title.cmp(&b.title),
        }
        .then(a.id.cmp(&b.id));

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    fn like_pattern(&self) -> Option<String> {
        self.query.as_deref().map(|q| format!("%{}%", escape_like(q)))
    }
}

/// Escape LIKE wildcards so user input is matched literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Insert a video row
pub async fn insert_video<'e, E>(executor: E, video: &NewVideo) -> Result<Video, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO videos (owner_id, title, description, video_url, video_public_id,
                            thumbnail_url, thumbnail_public_id, duration_secs)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, owner_id, title, description, video_url, video_public_id,
                  thumbnail_url, thumbnail_public_id, duration_secs, views,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(video.owner_id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.video_url)
    .bind(&video.video_public_id)
    .bind(&video.thumbnail_url)
    .bind(&video.thumbnail_public_id)
    .bind(video.duration_secs)
    .fetch_one(executor)
    .await
}

/// Get a video by ID
pub async fn get_video_by_id<'e, E>(executor: E, video_id: i64) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, owner_id, title, description, video_url, video_public_id,
               thumbnail_url, thumbnail_public_id, duration_secs, views,
               is_published, created_at, updated_at
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(executor)
    .await
}

/// Count videos matching a filter
pub async fn count_videos<'e, E>(executor: E, filter: &VideoFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM videos
        WHERE ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
          AND ($2::bigint IS NULL OR owner_id = $2)
        "#,
    )
    .bind(filter.like_pattern())
    .bind(filter.owner_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// List one page of videos matching a filter
pub async fn list_videos_paginated<'e, E>(
    executor: E,
    filter: &VideoFilter,
    page: PageRequest,
) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    // Column and direction come from closed enums, never from user text
    let query = format!(
        r#"SELECT id, owner_id, title, description, video_url, video_public_id,
                  thumbnail_url, thumbnail_public_id, duration_secs, views,
                  is_published, created_at, updated_at
           FROM videos
           WHERE ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
             AND ($2::bigint IS NULL OR owner_id = $2)
           ORDER BY {column} {order}, id {order}
           LIMIT $3 OFFSET $4"#,
        column = filter.sort_by.column(),
        order = filter.order.keyword(),
    );

    sqlx::query_as(&query)
        .bind(filter.like_pattern())
        .bind(filter.owner_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(executor)
        .await
}

/// List every video owned by a user, newest first
pub async fn list_videos_by_owner<'e, E>(executor: E, owner_id: i64) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, owner_id, title, description, video_url, video_public_id,
               thumbnail_url, thumbnail_public_id, duration_secs, views,
               is_published, created_at, updated_at
        FROM videos
        WHERE owner_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(executor)
    .await
}

/// Fetch videos by id (unordered; missing ids are skipped)
pub async fn list_videos_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, owner_id, title, description, video_url, video_public_id,
               thumbnail_url, thumbnail_public_id, duration_secs, views,
               is_published, created_at, updated_at
        FROM videos
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

/// Apply a partial update, returning the updated row
pub async fn update_video<'e, E>(
    executor: E,
    video_id: i64,
    changes: &VideoChanges,
) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE videos
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            thumbnail_url = COALESCE($4, thumbnail_url),
            thumbnail_public_id = COALESCE($5, thumbnail_public_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, title, description, video_url, video_public_id,
                  thumbnail_url, thumbnail_public_id, duration_secs, views,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(video_id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(&changes.thumbnail_url)
    .bind(&changes.thumbnail_public_id)
    .fetch_optional(executor)
    .await
}

/// Flip the published flag in place (atomic, no read-modify-write)
pub async fn toggle_video_published<'e, E>(
    executor: E,
    video_id: i64,
) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE videos
        SET is_published = NOT is_published, updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, title, description, video_url, video_public_id,
                  thumbnail_url, thumbnail_public_id, duration_secs, views,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(video_id)
    .fetch_optional(executor)
    .await
}

/// Delete a video. Comments, likes and playlist entries cascade.
pub async fn delete_video<'e, E>(executor: E, video_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
