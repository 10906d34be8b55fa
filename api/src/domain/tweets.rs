//! Tweet domain - models and DB queries for short text posts

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, Postgres};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tweet {
    pub id: i64,
    pub owner_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn insert_tweet<'e, E>(executor: E, owner_id: i64, content: &str) -> Result<Tweet, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO tweets (owner_id, content)
        VALUES ($1, $2)
        RETURNING id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(content)
    .fetch_one(executor)
    .await
}

pub async fn get_tweet_by_id<'e, E>(executor: E, tweet_id: i64) -> Result<Option<Tweet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, owner_id, content, created_at, updated_at
        FROM tweets
        WHERE id = $1
        "#,
    )
    .bind(tweet_id)
    .fetch_optional(executor)
    .await
}

/// List a user's tweets, newest first
pub async fn list_tweets_by_owner<'e, E>(executor: E, owner_id: i64) -> Result<Vec<Tweet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, owner_id, content, created_at, updated_at
        FROM tweets
        WHERE owner_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(executor)
    .await
}

pub async fn update_tweet_content<'e, E>(
    executor: E,
    tweet_id: i64,
    content: &str,
) -> Result<Option<Tweet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE tweets
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, content, created_at, updated_at
        "#,
    )
    .bind(tweet_id)
    .bind(content)
    .fetch_optional(executor)
    .await
}

/// Delete a tweet. Likes on it cascade.
pub async fn delete_tweet<'e, E>(executor: E, tweet_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
