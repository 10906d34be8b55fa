//! Comment domain - models and DB queries for video comments

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, Postgres};

use super::PageRequest;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub video_id: i64,
    pub owner_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert a comment on a video
pub async fn insert_comment<'e, E>(
    executor: E,
    video_id: i64,
    owner_id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO comments (video_id, owner_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, video_id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(video_id)
    .bind(owner_id)
    .bind(content)
    .fetch_one(executor)
    .await
}

/// Get a comment by ID
pub async fn get_comment_by_id<'e, E>(
    executor: E,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, video_id, owner_id, content, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(executor)
    .await
}

/// List one page of a video's comments, oldest first
pub async fn list_comments_for_video<'e, E>(
    executor: E,
    video_id: i64,
    page: PageRequest,
) -> Result<Vec<Comment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, video_id, owner_id, content, created_at, updated_at
        FROM comments
        WHERE video_id = $1
        ORDER BY created_at ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(video_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(executor)
    .await
}

/// Replace a comment's content
pub async fn update_comment_content<'e, E>(
    executor: E,
    comment_id: i64,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE comments
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, video_id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(comment_id)
    .bind(content)
    .fetch_optional(executor)
    .await
}

/// Delete a comment. Likes on it cascade.
pub async fn delete_comment<'e, E>(executor: E, comment_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
