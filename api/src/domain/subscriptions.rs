//! Subscription domain - channel subscriptions and their DB queries
//!
//! `UNIQUE (subscriber_id, channel_id)` and `CHECK (subscriber_id <> channel_id)`
//! back the toggle invariants at the database level.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, Postgres};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subscriber {
    pub subscriber_id: i64,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubscribedChannel {
    pub channel_id: i64,
    pub subscribed_at: DateTime<Utc>,
}

pub async fn delete_subscription<'e, E>(
    executor: E,
    subscriber_id: i64,
    channel_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2",
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert a subscription unless one already exists
pub async fn insert_subscription<'e, E>(
    executor: E,
    subscriber_id: i64,
    channel_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO subscriptions (subscriber_id, channel_id)
        VALUES ($1, $2)
        ON CONFLICT (subscriber_id, channel_id) DO NOTHING
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Users subscribed to a channel, newest first
pub async fn list_subscribers<'e, E>(executor: E, channel_id: i64) -> Result<Vec<Subscriber>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT subscriber_id, created_at AS subscribed_at
        FROM subscriptions
        WHERE channel_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(channel_id)
    .fetch_all(executor)
    .await
}

/// Channels a user subscribes to, newest first
pub async fn list_subscribed_channels<'e, E>(
    executor: E,
    subscriber_id: i64,
) -> Result<Vec<SubscribedChannel>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT channel_id, created_at AS subscribed_at
        FROM subscriptions
        WHERE subscriber_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(subscriber_id)
    .fetch_all(executor)
    .await
}
